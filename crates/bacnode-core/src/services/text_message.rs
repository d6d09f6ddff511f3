use crate::apdu::{ConfirmedRequestHeader, UnconfirmedRequestHeader};
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_optional_ctx_character_string,
        encode_closing_tag, encode_ctx_character_string,
        encode_ctx_object_id, encode_ctx_unsigned, encode_opening_tag,
    },
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
use crate::services::{expect_closing, expect_opening};
use crate::types::ObjectId;
use crate::{DecodeError, EncodeError};

pub const SERVICE_CONFIRMED_TEXT_MESSAGE: u8 = 0x13;
pub const SERVICE_UNCONFIRMED_TEXT_MESSAGE: u8 = 0x05;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageClass {
    Numeric(u32),
    Text(String),
}

/// Body shared by ConfirmedTextMessage and UnconfirmedTextMessage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub source_device: ObjectId,
    pub class: Option<MessageClass>,
    pub urgent: bool,
    pub message: String,
}

impl TextMessage {
    pub fn encode_confirmed(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_CONFIRMED_TEXT_MESSAGE).encode(w)?;
        self.encode_body(w)
    }

    pub fn encode_unconfirmed(&self, w: &mut Writer) -> Result<(), EncodeError> {
        UnconfirmedRequestHeader {
            service_choice: SERVICE_UNCONFIRMED_TEXT_MESSAGE,
        }
        .encode(w)?;
        self.encode_body(w)
    }

    fn encode_body(&self, w: &mut Writer) -> Result<(), EncodeError> {
        encode_ctx_object_id(w, 0, self.source_device)?;
        if let Some(class) = &self.class {
            encode_opening_tag(w, 1)?;
            match class {
                MessageClass::Numeric(n) => encode_ctx_unsigned(w, 0, *n)?,
                MessageClass::Text(s) => encode_ctx_character_string(w, 1, s)?,
            }
            encode_closing_tag(w, 1)?;
        }
        encode_ctx_unsigned(w, 2, u32::from(self.urgent))?;
        encode_ctx_character_string(w, 3, &self.message)
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let source_device = decode_ctx_object_id(r, 0)?;
        let mut next = *r;
        let class = if matches!(Tag::decode(&mut next), Ok(Tag::Opening { tag_num: 1 })) {
            expect_opening(r, 1)?;
            let class = match Tag::peek_context(r) {
                Some(0) => MessageClass::Numeric(decode_ctx_unsigned(r, 0)?),
                Some(1) => MessageClass::Text(
                    decode_optional_ctx_character_string(r, 1)?
                        .ok_or(DecodeError::InvalidTag)?,
                ),
                _ => return Err(DecodeError::InvalidTag),
            };
            expect_closing(r, 1)?;
            Some(class)
        } else {
            None
        };
        let urgent = match decode_ctx_unsigned(r, 2)? {
            0 => false,
            1 => true,
            _ => return Err(DecodeError::InvalidValue),
        };
        let message =
            decode_optional_ctx_character_string(r, 3)?.ok_or(DecodeError::MissingParameter)?;
        Ok(Self {
            source_device,
            class,
            urgent,
            message,
        })
    }
}
