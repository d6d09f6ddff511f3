use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_optional_ctx_boolean,
        decode_optional_ctx_unsigned, encode_ctx_boolean, encode_ctx_object_id,
        encode_ctx_unsigned,
    },
    reader::Reader,
    writer::Writer,
};
use crate::types::ObjectId;
use crate::{DecodeError, EncodeError};

pub const SERVICE_SUBSCRIBE_COV: u8 = 0x05;

/// SubscribeCOV parameters. A request without the confirmed flag and the
/// lifetime cancels the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeCovRequest {
    pub subscriber_process_id: u32,
    pub monitored_object_id: ObjectId,
    pub issue_confirmed_notifications: Option<bool>,
    pub lifetime_seconds: Option<u32>,
}

impl SubscribeCovRequest {
    pub fn is_cancellation(&self) -> bool {
        self.issue_confirmed_notifications.is_none() && self.lifetime_seconds.is_none()
    }

    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_SUBSCRIBE_COV).encode(w)?;
        encode_ctx_unsigned(w, 0, self.subscriber_process_id)?;
        encode_ctx_object_id(w, 1, self.monitored_object_id)?;
        if let Some(confirmed) = self.issue_confirmed_notifications {
            encode_ctx_boolean(w, 2, confirmed)?;
        }
        if let Some(lifetime) = self.lifetime_seconds {
            encode_ctx_unsigned(w, 3, lifetime)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let subscriber_process_id = decode_ctx_unsigned(r, 0)?;
        let monitored_object_id = decode_ctx_object_id(r, 1)?;
        let issue_confirmed_notifications = decode_optional_ctx_boolean(r, 2)?;
        let lifetime_seconds = decode_optional_ctx_unsigned(r, 3)?;
        Ok(Self {
            subscriber_process_id,
            monitored_object_id,
            issue_confirmed_notifications,
            lifetime_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SubscribeCovRequest;
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{ObjectId, ObjectType};

    #[test]
    fn subscription_and_cancellation() {
        let sub = SubscribeCovRequest {
            subscriber_process_id: 17,
            monitored_object_id: ObjectId::new(ObjectType::AnalogValue, 2),
            issue_confirmed_notifications: Some(false),
            lifetime_seconds: Some(300),
        };
        let mut w = Writer::new();
        sub.encode(&mut w, 1).unwrap();
        let decoded =
            SubscribeCovRequest::decode_after_header(&mut Reader::new(&w.as_written()[4..]))
                .unwrap();
        assert_eq!(decoded, sub);
        assert!(!decoded.is_cancellation());

        let cancel = SubscribeCovRequest {
            issue_confirmed_notifications: None,
            lifetime_seconds: None,
            ..sub
        };
        let mut w = Writer::new();
        cancel.encode(&mut w, 2).unwrap();
        let decoded =
            SubscribeCovRequest::decode_after_header(&mut Reader::new(&w.as_written()[4..]))
                .unwrap();
        assert!(decoded.is_cancellation());
    }
}
