use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_optional_ctx_boolean,
        decode_optional_ctx_real, decode_optional_ctx_unsigned, encode_closing_tag,
        encode_ctx_boolean, encode_ctx_object_id, encode_ctx_real, encode_ctx_unsigned,
        encode_opening_tag,
    },
    reader::Reader,
    writer::Writer,
};
use crate::services::{expect_closing, expect_opening, read_property_multiple::PropertyReference};
use crate::types::{ObjectId, PropertyId};
use crate::{DecodeError, EncodeError};

pub const SERVICE_SUBSCRIBE_COV_PROPERTY: u8 = 0x1C;

/// SubscribeCOVProperty parameters. As with SubscribeCOV, omitting both the
/// confirmed flag and the lifetime cancels the subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscribeCovPropertyRequest {
    pub subscriber_process_id: u32,
    pub monitored_object_id: ObjectId,
    pub issue_confirmed_notifications: Option<bool>,
    pub lifetime_seconds: Option<u32>,
    pub monitored_property: PropertyReference,
    pub cov_increment: Option<f32>,
}

impl SubscribeCovPropertyRequest {
    pub fn cancel(
        subscriber_process_id: u32,
        monitored_object_id: ObjectId,
        property_id: PropertyId,
    ) -> Self {
        Self {
            subscriber_process_id,
            monitored_object_id,
            issue_confirmed_notifications: None,
            lifetime_seconds: None,
            monitored_property: PropertyReference {
                property_id,
                array_index: None,
            },
            cov_increment: None,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        self.issue_confirmed_notifications.is_none() && self.lifetime_seconds.is_none()
    }

    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_SUBSCRIBE_COV_PROPERTY).encode(w)?;
        encode_ctx_unsigned(w, 0, self.subscriber_process_id)?;
        encode_ctx_object_id(w, 1, self.monitored_object_id)?;
        if let Some(confirmed) = self.issue_confirmed_notifications {
            encode_ctx_boolean(w, 2, confirmed)?;
        }
        if let Some(lifetime) = self.lifetime_seconds {
            encode_ctx_unsigned(w, 3, lifetime)?;
        }
        encode_opening_tag(w, 4)?;
        encode_ctx_unsigned(w, 0, self.monitored_property.property_id.to_u32())?;
        if let Some(idx) = self.monitored_property.array_index {
            encode_ctx_unsigned(w, 1, idx)?;
        }
        encode_closing_tag(w, 4)?;
        if let Some(increment) = self.cov_increment {
            encode_ctx_real(w, 5, increment)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let subscriber_process_id = decode_ctx_unsigned(r, 0)?;
        let monitored_object_id = decode_ctx_object_id(r, 1)?;
        let issue_confirmed_notifications = decode_optional_ctx_boolean(r, 2)?;
        let lifetime_seconds = decode_optional_ctx_unsigned(r, 3)?;
        expect_opening(r, 4)?;
        let property_id = PropertyId::from_u32(decode_ctx_unsigned(r, 0)?);
        let array_index = decode_optional_ctx_unsigned(r, 1)?;
        expect_closing(r, 4)?;
        let cov_increment = decode_optional_ctx_real(r, 5)?;
        Ok(Self {
            subscriber_process_id,
            monitored_object_id,
            issue_confirmed_notifications,
            lifetime_seconds,
            monitored_property: PropertyReference {
                property_id,
                array_index,
            },
            cov_increment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SubscribeCovPropertyRequest;
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::services::read_property_multiple::PropertyReference;
    use crate::types::{ObjectId, ObjectType, PropertyId};
    use crate::DecodeError;

    #[test]
    fn subscription_with_increment_decodes() {
        let req = SubscribeCovPropertyRequest {
            subscriber_process_id: 9,
            monitored_object_id: ObjectId::new(ObjectType::AnalogInput, 11),
            issue_confirmed_notifications: Some(false),
            lifetime_seconds: Some(300),
            monitored_property: PropertyReference {
                property_id: PropertyId::PresentValue,
                array_index: None,
            },
            cov_increment: Some(0.5),
        };
        let mut w = Writer::new();
        req.encode(&mut w, 4).unwrap();
        let mut r = Reader::new(&w.as_written()[4..]);
        let decoded = SubscribeCovPropertyRequest::decode_after_header(&mut r).unwrap();
        assert_eq!(decoded, req);
        assert!(!decoded.is_cancellation());
        assert!(r.is_empty());
    }

    #[test]
    fn cancellation_has_no_lifetime() {
        let cancel = SubscribeCovPropertyRequest::cancel(
            9,
            ObjectId::new(ObjectType::AnalogInput, 11),
            PropertyId::StatusFlags,
        );
        let mut w = Writer::new();
        cancel.encode(&mut w, 5).unwrap();
        let mut r = Reader::new(&w.as_written()[4..]);
        let decoded = SubscribeCovPropertyRequest::decode_after_header(&mut r).unwrap();
        assert!(decoded.is_cancellation());
        assert_eq!(decoded.monitored_property.property_id, PropertyId::StatusFlags);
    }

    #[test]
    fn missing_property_reference_is_reported() {
        // Process id and object only.
        let mut r = Reader::new(&[0x09, 0x09, 0x1C, 0x00, 0x00, 0x00, 0x0B]);
        assert_eq!(
            SubscribeCovPropertyRequest::decode_after_header(&mut r).unwrap_err(),
            DecodeError::MissingParameter
        );
    }
}
