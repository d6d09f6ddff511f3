use std::net::Ipv4Addr;

use crate::encoding::{
    primitives::{
        decode_character_string, decode_signed, decode_unsigned, encode_closing_tag,
        encode_ctx_character_string, encode_ctx_octet_string, encode_ctx_unsigned,
        encode_opening_tag, encode_signed, encode_unsigned, signed_len, unsigned_len,
        CHARSET_UTF8,
    },
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{BitString, Date, HostAddress, HostNPort, ObjectId, PropertyValue, Time};
use crate::{DecodeError, EncodeError};

fn u32_len(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::ValueOutOfRange)
}

/// Encodes a property value as BACnet application data. Arrays are written
/// as the plain sequence of their elements.
pub fn encode_property_value(w: &mut Writer, value: &PropertyValue) -> Result<(), EncodeError> {
    match value {
        PropertyValue::Null => Tag::Application {
            tag: AppTag::Null,
            len: 0,
        }
        .encode(w),
        PropertyValue::Boolean(v) => Tag::Application {
            tag: AppTag::Boolean,
            len: u32::from(*v),
        }
        .encode(w),
        PropertyValue::Unsigned(v) => {
            Tag::Application {
                tag: AppTag::UnsignedInt,
                len: unsigned_len(*v) as u32,
            }
            .encode(w)?;
            encode_unsigned(w, *v).map(|_| ())
        }
        PropertyValue::Signed(v) => {
            Tag::Application {
                tag: AppTag::SignedInt,
                len: signed_len(*v) as u32,
            }
            .encode(w)?;
            encode_signed(w, *v).map(|_| ())
        }
        PropertyValue::Real(v) => {
            Tag::Application {
                tag: AppTag::Real,
                len: 4,
            }
            .encode(w)?;
            w.write_be_u32(v.to_bits())
        }
        PropertyValue::Double(v) => {
            Tag::Application {
                tag: AppTag::Double,
                len: 8,
            }
            .encode(w)?;
            w.write_be_u64(v.to_bits())
        }
        PropertyValue::OctetString(v) => {
            Tag::Application {
                tag: AppTag::OctetString,
                len: u32_len(v.len())?,
            }
            .encode(w)?;
            w.write_all(v)
        }
        PropertyValue::CharacterString(v) => {
            Tag::Application {
                tag: AppTag::CharacterString,
                len: u32_len(v.len().saturating_add(1))?,
            }
            .encode(w)?;
            w.write_u8(CHARSET_UTF8)?;
            w.write_all(v.as_bytes())
        }
        PropertyValue::BitString(v) => {
            if v.unused_bits > 7 {
                return Err(EncodeError::ValueOutOfRange);
            }
            Tag::Application {
                tag: AppTag::BitString,
                len: u32_len(v.data.len().saturating_add(1))?,
            }
            .encode(w)?;
            w.write_u8(v.unused_bits)?;
            w.write_all(&v.data)
        }
        PropertyValue::Enumerated(v) => {
            Tag::Application {
                tag: AppTag::Enumerated,
                len: unsigned_len(*v) as u32,
            }
            .encode(w)?;
            encode_unsigned(w, *v).map(|_| ())
        }
        PropertyValue::Date(v) => {
            Tag::Application {
                tag: AppTag::Date,
                len: 4,
            }
            .encode(w)?;
            w.write_all(&v.to_bytes())
        }
        PropertyValue::Time(v) => {
            Tag::Application {
                tag: AppTag::Time,
                len: 4,
            }
            .encode(w)?;
            w.write_all(&v.to_bytes())
        }
        PropertyValue::ObjectId(v) => {
            Tag::Application {
                tag: AppTag::ObjectId,
                len: 4,
            }
            .encode(w)?;
            w.write_be_u32(v.raw())
        }
        PropertyValue::HostNPort(v) => encode_host_n_port(w, v),
        PropertyValue::Array(items) => {
            for item in items {
                encode_property_value(w, item)?;
            }
            Ok(())
        }
    }
}

fn encode_host_n_port(w: &mut Writer, value: &HostNPort) -> Result<(), EncodeError> {
    encode_opening_tag(w, 0)?;
    match &value.host {
        HostAddress::None => Tag::Context { tag_num: 0, len: 0 }.encode(w)?,
        HostAddress::Ip(addr) => encode_ctx_octet_string(w, 1, &addr.octets())?,
        HostAddress::Name(name) => encode_ctx_character_string(w, 2, name)?,
    }
    encode_closing_tag(w, 0)?;
    encode_ctx_unsigned(w, 1, u32::from(value.port))
}

/// Decodes the application data between an opening tag and its closing tag
/// `closing_tag_num`. The closing tag is left unread.
///
/// A single element decodes to a scalar; several elements (or none) decode to
/// [`PropertyValue::Array`].
pub fn decode_property_value(
    r: &mut Reader<'_>,
    closing_tag_num: u8,
) -> Result<PropertyValue, DecodeError> {
    let mut items = Vec::new();
    while !Tag::peek_is_closing(r, closing_tag_num) {
        if r.is_empty() {
            return Err(DecodeError::UnexpectedEof);
        }
        items.push(decode_application_value(r)?);
    }
    if items.len() == 1 {
        Ok(items.remove(0))
    } else {
        Ok(PropertyValue::Array(items))
    }
}

/// Decodes one application-tagged value (or a HostNPort construct).
pub fn decode_application_value(r: &mut Reader<'_>) -> Result<PropertyValue, DecodeError> {
    match Tag::decode(r)? {
        Tag::Opening { tag_num: 0 } => decode_host_n_port_body(r).map(PropertyValue::HostNPort),
        Tag::Application { tag, len } => decode_application_body(r, tag, len),
        _ => Err(DecodeError::InvalidTag),
    }
}

fn decode_application_body(
    r: &mut Reader<'_>,
    tag: AppTag,
    len: u32,
) -> Result<PropertyValue, DecodeError> {
    let len = len as usize;
    Ok(match tag {
        AppTag::Null => PropertyValue::Null,
        AppTag::Boolean => PropertyValue::Boolean(len != 0),
        AppTag::UnsignedInt => PropertyValue::Unsigned(decode_unsigned(r, len)?),
        AppTag::SignedInt => PropertyValue::Signed(decode_signed(r, len)?),
        AppTag::Real if len == 4 => PropertyValue::Real(f32::from_bits(r.read_be_u32()?)),
        AppTag::Double if len == 8 => PropertyValue::Double(f64::from_bits(r.read_be_u64()?)),
        AppTag::OctetString => PropertyValue::OctetString(r.read_exact(len)?.to_vec()),
        AppTag::CharacterString => {
            PropertyValue::CharacterString(decode_character_string(r.read_exact(len)?)?)
        }
        AppTag::BitString => {
            let raw = r.read_exact(len)?;
            let (unused_bits, data) = raw.split_first().ok_or(DecodeError::InvalidLength)?;
            if *unused_bits > 7 {
                return Err(DecodeError::InvalidValue);
            }
            PropertyValue::BitString(BitString::new(*unused_bits, data.to_vec()))
        }
        AppTag::Enumerated => PropertyValue::Enumerated(decode_unsigned(r, len)?),
        AppTag::Date if len == 4 => PropertyValue::Date(Date::from_bytes(r.read_array::<4>()?)),
        AppTag::Time if len == 4 => PropertyValue::Time(Time::from_bytes(r.read_array::<4>()?)),
        AppTag::ObjectId if len == 4 => {
            PropertyValue::ObjectId(ObjectId::from_raw(r.read_be_u32()?))
        }
        _ => return Err(DecodeError::InvalidLength),
    })
}

fn decode_host_n_port_body(r: &mut Reader<'_>) -> Result<HostNPort, DecodeError> {
    let host = match Tag::decode(r)? {
        Tag::Context { tag_num: 0, len: 0 } => HostAddress::None,
        Tag::Context { tag_num: 1, len: 4 } => HostAddress::Ip(Ipv4Addr::from(r.read_array::<4>()?)),
        Tag::Context { tag_num: 2, len } => {
            HostAddress::Name(decode_character_string(r.read_exact(len as usize)?)?)
        }
        _ => return Err(DecodeError::InvalidTag),
    };
    match Tag::decode(r)? {
        Tag::Closing { tag_num: 0 } => {}
        _ => return Err(DecodeError::InvalidTag),
    }
    let port = match Tag::decode(r)? {
        Tag::Context { tag_num: 1, len } => decode_unsigned(r, len as usize)?,
        _ => return Err(DecodeError::InvalidTag),
    };
    let port = u16::try_from(port).map_err(|_| DecodeError::InvalidValue)?;
    Ok(HostNPort { host, port })
}
