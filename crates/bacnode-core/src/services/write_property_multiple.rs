use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_optional_ctx_unsigned,
        encode_closing_tag, encode_ctx_object_id, encode_ctx_unsigned, encode_opening_tag,
    },
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
use crate::services::{
    expect_closing, expect_opening,
    value_codec::{decode_property_value, encode_property_value},
};
use crate::types::{ObjectId, PropertyId, PropertyValue};
use crate::{DecodeError, EncodeError};

pub const SERVICE_WRITE_PROPERTY_MULTIPLE: u8 = 0x10;

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyWriteSpec {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: PropertyValue,
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteAccessSpec {
    pub object_id: ObjectId,
    pub properties: Vec<PropertyWriteSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WritePropertyMultipleRequest {
    pub specs: Vec<WriteAccessSpec>,
}

impl WritePropertyMultipleRequest {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_WRITE_PROPERTY_MULTIPLE).encode(w)?;
        for spec in &self.specs {
            encode_ctx_object_id(w, 0, spec.object_id)?;
            encode_opening_tag(w, 1)?;
            for prop in &spec.properties {
                encode_ctx_unsigned(w, 0, prop.property_id.to_u32())?;
                if let Some(idx) = prop.array_index {
                    encode_ctx_unsigned(w, 1, idx)?;
                }
                encode_opening_tag(w, 2)?;
                encode_property_value(w, &prop.value)?;
                encode_closing_tag(w, 2)?;
                if let Some(priority) = prop.priority {
                    encode_ctx_unsigned(w, 3, u32::from(priority))?;
                }
            }
            encode_closing_tag(w, 1)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let mut specs = Vec::new();
        loop {
            let object_id = decode_ctx_object_id(r, 0)?;
            expect_opening(r, 1)?;
            let mut properties = Vec::new();
            while !Tag::peek_is_closing(r, 1) {
                let property_id = PropertyId::from_u32(decode_ctx_unsigned(r, 0)?);
                let array_index = decode_optional_ctx_unsigned(r, 1)?;
                expect_opening(r, 2)?;
                let value = decode_property_value(r, 2)?;
                expect_closing(r, 2)?;
                let priority = match decode_optional_ctx_unsigned(r, 3)? {
                    None => None,
                    Some(p @ 1..=16) => Some(p as u8),
                    Some(_) => return Err(DecodeError::InvalidValue),
                };
                properties.push(PropertyWriteSpec {
                    property_id,
                    array_index,
                    value,
                    priority,
                });
            }
            expect_closing(r, 1)?;
            if properties.is_empty() {
                return Err(DecodeError::MissingParameter);
            }
            specs.push(WriteAccessSpec {
                object_id,
                properties,
            });
            if r.is_empty() {
                break;
            }
        }
        Ok(Self { specs })
    }
}
