use crate::apdu::UnconfirmedRequestHeader;
use crate::encoding::{
    primitives::{encode_closing_tag, encode_ctx_object_id, encode_ctx_unsigned, encode_opening_tag},
    writer::Writer,
};
use crate::services::value_codec::encode_property_value;
use crate::types::{ObjectId, PropertyId, PropertyValue};
use crate::EncodeError;

pub const SERVICE_UNCONFIRMED_COV_NOTIFICATION: u8 = 0x02;

#[derive(Debug, Clone, PartialEq)]
pub struct CovNotification {
    pub subscriber_process_id: u32,
    pub initiating_device_id: ObjectId,
    pub monitored_object_id: ObjectId,
    pub time_remaining_seconds: u32,
    pub values: Vec<(PropertyId, PropertyValue)>,
}

impl CovNotification {
    pub fn encode_unconfirmed(&self, w: &mut Writer) -> Result<(), EncodeError> {
        UnconfirmedRequestHeader {
            service_choice: SERVICE_UNCONFIRMED_COV_NOTIFICATION,
        }
        .encode(w)?;
        encode_ctx_unsigned(w, 0, self.subscriber_process_id)?;
        encode_ctx_object_id(w, 1, self.initiating_device_id)?;
        encode_ctx_object_id(w, 2, self.monitored_object_id)?;
        encode_ctx_unsigned(w, 3, self.time_remaining_seconds)?;
        encode_opening_tag(w, 4)?;
        for (property_id, value) in &self.values {
            encode_ctx_unsigned(w, 0, property_id.to_u32())?;
            encode_opening_tag(w, 2)?;
            encode_property_value(w, value)?;
            encode_closing_tag(w, 2)?;
        }
        encode_closing_tag(w, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::CovNotification;
    use crate::encoding::writer::Writer;
    use crate::types::{BitString, ObjectId, ObjectType, PropertyId, PropertyValue};

    #[test]
    fn notification_layout() {
        let n = CovNotification {
            subscriber_process_id: 1,
            initiating_device_id: ObjectId::new(ObjectType::Device, 5),
            monitored_object_id: ObjectId::new(ObjectType::BinaryValue, 5),
            time_remaining_seconds: 60,
            values: vec![
                (PropertyId::PresentValue, PropertyValue::Enumerated(1)),
                (
                    PropertyId::StatusFlags,
                    PropertyValue::BitString(BitString::from_bits(&[false; 4])),
                ),
            ],
        };
        let mut w = Writer::new();
        n.encode_unconfirmed(&mut w).unwrap();
        assert_eq!(
            w.as_written(),
            &[
                0x10, 0x02, 0x09, 0x01, 0x1C, 0x02, 0x00, 0x00, 0x05, 0x2C, 0x01, 0x40, 0x00,
                0x05, 0x39, 0x3C, 0x4E, 0x09, 0x55, 0x2E, 0x91, 0x01, 0x2F, 0x09, 0x6F, 0x2E,
                0x82, 0x04, 0x00, 0x2F, 0x4F
            ]
        );
    }
}
