use crate::apdu::{ComplexAckHeader, ConfirmedRequestHeader};
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_optional_ctx_unsigned,
        encode_app_enumerated, encode_closing_tag, encode_ctx_object_id, encode_ctx_unsigned,
        encode_opening_tag,
    },
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
use crate::services::{expect_closing, expect_opening, value_codec::encode_property_value};
use crate::types::{ErrorClass, ErrorCode, ObjectId, PropertyId, PropertyValue};
use crate::{DecodeError, EncodeError};

pub const SERVICE_READ_PROPERTY_MULTIPLE: u8 = 0x0E;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyReference {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAccessSpec {
    pub object_id: ObjectId,
    pub properties: Vec<PropertyReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPropertyMultipleRequest {
    pub specs: Vec<ReadAccessSpec>,
}

impl ReadPropertyMultipleRequest {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_READ_PROPERTY_MULTIPLE).encode(w)?;
        for spec in &self.specs {
            encode_ctx_object_id(w, 0, spec.object_id)?;
            encode_opening_tag(w, 1)?;
            for prop in &spec.properties {
                encode_ctx_unsigned(w, 0, prop.property_id.to_u32())?;
                if let Some(idx) = prop.array_index {
                    encode_ctx_unsigned(w, 1, idx)?;
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
                properties.push(PropertyReference {
                    property_id,
                    array_index,
                });
            }
            expect_closing(r, 1)?;
            if properties.is_empty() {
                return Err(DecodeError::MissingParameter);
            }
            specs.push(ReadAccessSpec {
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

/// Outcome of reading one property; failures are reported inline.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: Result<PropertyValue, (ErrorClass, ErrorCode)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadAccessResult {
    pub object_id: ObjectId,
    pub results: Vec<ReadResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropertyMultipleAck {
    pub results: Vec<ReadAccessResult>,
}

impl ReadPropertyMultipleAck {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ComplexAckHeader {
            invoke_id,
            service_choice: SERVICE_READ_PROPERTY_MULTIPLE,
        }
        .encode(w)?;
        for access in &self.results {
            encode_ctx_object_id(w, 0, access.object_id)?;
            encode_opening_tag(w, 1)?;
            for result in &access.results {
                encode_ctx_unsigned(w, 2, result.property_id.to_u32())?;
                if let Some(idx) = result.array_index {
                    encode_ctx_unsigned(w, 3, idx)?;
                }
                match &result.value {
                    Ok(value) => {
                        encode_opening_tag(w, 4)?;
                        encode_property_value(w, value)?;
                        encode_closing_tag(w, 4)?;
                    }
                    Err((class, code)) => {
                        encode_opening_tag(w, 5)?;
                        encode_app_enumerated(w, class.to_u32())?;
                        encode_app_enumerated(w, code.to_u32())?;
                        encode_closing_tag(w, 5)?;
                    }
                }
            }
            encode_closing_tag(w, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        PropertyReference, ReadAccessResult, ReadAccessSpec, ReadPropertyMultipleAck,
        ReadPropertyMultipleRequest, ReadResult,
    };
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{ErrorClass, ErrorCode, ObjectId, ObjectType, PropertyId, PropertyValue};
    use crate::DecodeError;

    #[test]
    fn request_with_two_objects_decodes() {
        let req = ReadPropertyMultipleRequest {
            specs: vec![
                ReadAccessSpec {
                    object_id: ObjectId::new(ObjectType::AnalogInput, 0),
                    properties: vec![
                        PropertyReference {
                            property_id: PropertyId::PresentValue,
                            array_index: None,
                        },
                        PropertyReference {
                            property_id: PropertyId::StatusFlags,
                            array_index: None,
                        },
                    ],
                },
                ReadAccessSpec {
                    object_id: ObjectId::new(ObjectType::NetworkPort, 50),
                    properties: vec![PropertyReference {
                        property_id: PropertyId::IpDnsServer,
                        array_index: Some(0),
                    }],
                },
            ],
        };
        let mut w = Writer::new();
        req.encode(&mut w, 4).unwrap();
        let mut r = Reader::new(&w.as_written()[4..]);
        assert_eq!(ReadPropertyMultipleRequest::decode_after_header(&mut r).unwrap(), req);
    }

    #[test]
    fn empty_property_list_is_missing_parameter() {
        let mut r = Reader::new(&[0x0C, 0x00, 0x00, 0x00, 0x00, 0x1E, 0x1F]);
        assert_eq!(
            ReadPropertyMultipleRequest::decode_after_header(&mut r).unwrap_err(),
            DecodeError::MissingParameter
        );
    }

    #[test]
    fn ack_mixes_values_and_errors() {
        let ack = ReadPropertyMultipleAck {
            results: vec![ReadAccessResult {
                object_id: ObjectId::new(ObjectType::AnalogInput, 0),
                results: vec![
                    ReadResult {
                        property_id: PropertyId::Units,
                        array_index: None,
                        value: Ok(PropertyValue::Enumerated(62)),
                    },
                    ReadResult {
                        property_id: PropertyId::Description,
                        array_index: None,
                        value: Err((ErrorClass::Property, ErrorCode::UnknownProperty)),
                    },
                ],
            }],
        };
        let mut w = Writer::new();
        ack.encode(&mut w, 2).unwrap();
        assert_eq!(
            w.as_written(),
            &[
                0x30, 0x02, 0x0E, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x1E, 0x29, 0x75, 0x4E, 0x91,
                0x3E, 0x4F, 0x29, 0x1C, 0x5E, 0x91, 0x02, 0x91, 0x20, 0x5F, 0x1F
            ]
        );
    }
}
