use crate::encoding::{
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::ObjectId;
use crate::{DecodeError, EncodeError};

/// Character set byte for ANSI X3.4 / UTF-8.
pub const CHARSET_UTF8: u8 = 0;
/// Character set byte for ISO 8859-1.
pub const CHARSET_ISO_8859_1: u8 = 5;

/// Minimal number of octets needed to carry `value` as a BACnet unsigned.
pub const fn unsigned_len(value: u32) -> usize {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// Minimal number of octets needed to carry `value` as a two's-complement signed.
pub const fn signed_len(value: i32) -> usize {
    match value {
        -128..=127 => 1,
        -32_768..=32_767 => 2,
        -8_388_608..=8_388_607 => 3,
        _ => 4,
    }
}

pub fn encode_unsigned(w: &mut Writer, value: u32) -> Result<usize, EncodeError> {
    let len = unsigned_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    Ok(r
        .read_exact(len)?
        .iter()
        .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

pub fn encode_signed(w: &mut Writer, value: i32) -> Result<usize, EncodeError> {
    let len = signed_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut out = [fill; 4];
    out[4 - len..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(out))
}

/// Decodes a character string body (charset byte followed by the text).
pub fn decode_character_string(raw: &[u8]) -> Result<String, DecodeError> {
    let (charset, text) = raw.split_first().ok_or(DecodeError::InvalidLength)?;
    match *charset {
        CHARSET_UTF8 => core::str::from_utf8(text)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidValue),
        CHARSET_ISO_8859_1 => Ok(text.iter().map(|b| char::from(*b)).collect()),
        _ => Err(DecodeError::Unsupported),
    }
}

fn len_u32(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::ValueOutOfRange)
}

pub fn encode_app_unsigned(w: &mut Writer, value: u32) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::UnsignedInt,
        len: unsigned_len(value) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_app_enumerated(w: &mut Writer, value: u32) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Enumerated,
        len: unsigned_len(value) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_app_object_id(w: &mut Writer, id: ObjectId) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::ObjectId,
        len: 4,
    }
    .encode(w)?;
    w.write_be_u32(id.raw())
}

pub fn decode_app_unsigned(r: &mut Reader<'_>) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Application {
            tag: AppTag::UnsignedInt,
            len,
        } => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

pub fn encode_ctx_unsigned(w: &mut Writer, tag_num: u8, value: u32) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: unsigned_len(value) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_ctx_object_id(w: &mut Writer, tag_num: u8, id: ObjectId) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_be_u32(id.raw())
}

pub fn encode_ctx_boolean(w: &mut Writer, tag_num: u8, value: bool) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 1 }.encode(w)?;
    w.write_u8(u8::from(value))
}

pub fn encode_ctx_real(w: &mut Writer, tag_num: u8, value: f32) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_be_u32(value.to_bits())
}

pub fn encode_ctx_character_string(
    w: &mut Writer,
    tag_num: u8,
    value: &str,
) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: len_u32(value.len() + 1)?,
    }
    .encode(w)?;
    w.write_u8(CHARSET_UTF8)?;
    w.write_all(value.as_bytes())
}

pub fn encode_ctx_octet_string(w: &mut Writer, tag_num: u8, value: &[u8]) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: len_u32(value.len())?,
    }
    .encode(w)?;
    w.write_all(value)
}

pub fn encode_opening_tag(w: &mut Writer, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Opening { tag_num }.encode(w)
}

pub fn encode_closing_tag(w: &mut Writer, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Closing { tag_num }.encode(w)
}

/// Decodes a required context-tagged unsigned at `tag_num`.
pub fn decode_ctx_unsigned(r: &mut Reader<'_>, tag_num: u8) -> Result<u32, DecodeError> {
    if r.is_empty() {
        return Err(DecodeError::MissingParameter);
    }
    match Tag::decode(r)? {
        Tag::Context { tag_num: n, len } if n == tag_num => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

/// Decodes a context-tagged unsigned at `tag_num` if it is the next tag.
pub fn decode_optional_ctx_unsigned(
    r: &mut Reader<'_>,
    tag_num: u8,
) -> Result<Option<u32>, DecodeError> {
    if Tag::peek_context(r) == Some(tag_num) {
        decode_ctx_unsigned(r, tag_num).map(Some)
    } else {
        Ok(None)
    }
}

pub fn decode_ctx_object_id(r: &mut Reader<'_>, tag_num: u8) -> Result<ObjectId, DecodeError> {
    if r.is_empty() {
        return Err(DecodeError::MissingParameter);
    }
    match Tag::decode(r)? {
        Tag::Context { tag_num: n, len: 4 } if n == tag_num => {
            Ok(ObjectId::from_raw(r.read_be_u32()?))
        }
        _ => Err(DecodeError::InvalidTag),
    }
}

pub fn decode_optional_ctx_boolean(
    r: &mut Reader<'_>,
    tag_num: u8,
) -> Result<Option<bool>, DecodeError> {
    if Tag::peek_context(r) != Some(tag_num) {
        return Ok(None);
    }
    match Tag::decode(r)? {
        Tag::Context { len: 1, .. } => Ok(Some(r.read_u8()? != 0)),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_optional_ctx_real(
    r: &mut Reader<'_>,
    tag_num: u8,
) -> Result<Option<f32>, DecodeError> {
    if Tag::peek_context(r) != Some(tag_num) {
        return Ok(None);
    }
    match Tag::decode(r)? {
        Tag::Context { len: 4, .. } => Ok(Some(f32::from_bits(r.read_be_u32()?))),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_optional_ctx_character_string(
    r: &mut Reader<'_>,
    tag_num: u8,
) -> Result<Option<String>, DecodeError> {
    if Tag::peek_context(r) != Some(tag_num) {
        return Ok(None);
    }
    match Tag::decode(r)? {
        Tag::Context { len, .. } => decode_character_string(r.read_exact(len as usize)?).map(Some),
        _ => Err(DecodeError::InvalidTag),
    }
}
