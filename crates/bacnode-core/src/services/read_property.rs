use crate::apdu::{ComplexAckHeader, ConfirmedRequestHeader};
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_optional_ctx_unsigned,
        encode_closing_tag, encode_ctx_object_id, encode_ctx_unsigned, encode_opening_tag,
    },
    reader::Reader,
    writer::Writer,
};
use crate::services::value_codec::encode_property_value;
use crate::types::{ObjectId, PropertyId, PropertyValue};
use crate::{DecodeError, EncodeError};

pub const SERVICE_READ_PROPERTY: u8 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPropertyRequest {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
}

impl ReadPropertyRequest {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_READ_PROPERTY).encode(w)?;
        encode_ctx_object_id(w, 0, self.object_id)?;
        encode_ctx_unsigned(w, 1, self.property_id.to_u32())?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let object_id = decode_ctx_object_id(r, 0)?;
        let property_id = PropertyId::from_u32(decode_ctx_unsigned(r, 1)?);
        let array_index = decode_optional_ctx_unsigned(r, 2)?;
        if !r.is_empty() {
            return Err(DecodeError::InvalidTag);
        }
        Ok(Self {
            object_id,
            property_id,
            array_index,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropertyAck {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: PropertyValue,
}

impl ReadPropertyAck {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ComplexAckHeader {
            invoke_id,
            service_choice: SERVICE_READ_PROPERTY,
        }
        .encode(w)?;
        encode_ctx_object_id(w, 0, self.object_id)?;
        encode_ctx_unsigned(w, 1, self.property_id.to_u32())?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        encode_opening_tag(w, 3)?;
        encode_property_value(w, &self.value)?;
        encode_closing_tag(w, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadPropertyAck, ReadPropertyRequest};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
    use crate::DecodeError;

    #[test]
    fn request_decodes_optional_index() {
        let req = ReadPropertyRequest {
            object_id: ObjectId::new(ObjectType::MultiStateInput, 13),
            property_id: PropertyId::StateText,
            array_index: Some(0),
        };
        let mut w = Writer::new();
        req.encode(&mut w, 1).unwrap();
        let mut r = Reader::new(&w.as_written()[4..]);
        assert_eq!(ReadPropertyRequest::decode_after_header(&mut r).unwrap(), req);
    }

    #[test]
    fn request_without_property_is_missing_parameter() {
        let mut r = Reader::new(&[0x0C, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            ReadPropertyRequest::decode_after_header(&mut r).unwrap_err(),
            DecodeError::MissingParameter
        );
    }

    #[test]
    fn ack_wraps_value_in_tag_three() {
        let ack = ReadPropertyAck {
            object_id: ObjectId::new(ObjectType::AnalogValue, 2),
            property_id: PropertyId::PresentValue,
            array_index: None,
            value: PropertyValue::Real(1.0),
        };
        let mut w = Writer::new();
        ack.encode(&mut w, 9).unwrap();
        assert_eq!(
            w.as_written(),
            &[
                0x30, 0x09, 0x0C, 0x0C, 0x00, 0x80, 0x00, 0x02, 0x19, 0x55, 0x3E, 0x44, 0x3F, 0x80,
                0x00, 0x00, 0x3F
            ]
        );
    }
}
