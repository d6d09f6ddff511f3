use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// Application tag numbers (ASHRAE 135 clause 20.2.1.4).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl AppTag {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::UnsignedInt,
            3 => Self::SignedInt,
            4 => Self::Real,
            5 => Self::Double,
            6 => Self::OctetString,
            7 => Self::CharacterString,
            8 => Self::BitString,
            9 => Self::Enumerated,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::ObjectId,
            _ => return Err(DecodeError::InvalidTag),
        })
    }
}

/// A decoded tag header. `len` is the length/value/type field after
/// extended-length resolution; for application booleans it carries the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Application { tag: AppTag, len: u32 },
    Context { tag_num: u8, len: u32 },
    Opening { tag_num: u8 },
    Closing { tag_num: u8 },
}

impl Tag {
    pub fn encode(self, w: &mut Writer) -> Result<(), EncodeError> {
        match self {
            Tag::Application { tag, len } => write_header(w, tag as u8, false, Lvt::Length(len)),
            Tag::Context { tag_num, len } => write_header(w, tag_num, true, Lvt::Length(len)),
            Tag::Opening { tag_num } => write_header(w, tag_num, true, Lvt::Opening),
            Tag::Closing { tag_num } => write_header(w, tag_num, true, Lvt::Closing),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let first = r.read_u8()?;
        let is_context = (first & 0x08) != 0;
        let tag_num = match first >> 4 {
            0x0F => r.read_u8()?,
            n => n,
        };

        match (is_context, first & 0x07) {
            (true, 6) => Ok(Tag::Opening { tag_num }),
            (true, 7) => Ok(Tag::Closing { tag_num }),
            (true, lvt) => Ok(Tag::Context {
                tag_num,
                len: read_length(r, lvt)?,
            }),
            (false, lvt) => {
                let tag = AppTag::from_u8(tag_num)?;
                // Application booleans keep their value in the LVT field.
                let len = if tag == AppTag::Boolean {
                    u32::from(lvt)
                } else {
                    read_length(r, lvt)?
                };
                Ok(Tag::Application { tag, len })
            }
        }
    }

    /// Whether the next tag is the closing tag `tag_num`, without consuming it.
    pub fn peek_is_closing(r: &Reader<'_>, tag_num: u8) -> bool {
        let mut next = *r;
        matches!(Tag::decode(&mut next), Ok(Tag::Closing { tag_num: n }) if n == tag_num)
    }

    /// Context tag number of the next tag, without consuming it.
    pub fn peek_context(r: &Reader<'_>) -> Option<u8> {
        let mut next = *r;
        match Tag::decode(&mut next) {
            Ok(Tag::Context { tag_num, .. }) => Some(tag_num),
            _ => None,
        }
    }
}

enum Lvt {
    Length(u32),
    Opening,
    Closing,
}

fn write_header(w: &mut Writer, tag_num: u8, is_context: bool, lvt: Lvt) -> Result<(), EncodeError> {
    let mut first = if tag_num <= 14 { tag_num << 4 } else { 0xF0 };
    if is_context {
        first |= 0x08;
    }
    let extended = match lvt {
        Lvt::Opening => {
            first |= 6;
            None
        }
        Lvt::Closing => {
            first |= 7;
            None
        }
        Lvt::Length(len) if len <= 4 => {
            first |= len as u8;
            None
        }
        Lvt::Length(len) => {
            first |= 5;
            Some(len)
        }
    };

    w.write_u8(first)?;
    if tag_num > 14 {
        w.write_u8(tag_num)?;
    }
    match extended {
        None => Ok(()),
        Some(len) if len <= 253 => w.write_u8(len as u8),
        Some(len) if len <= u32::from(u16::MAX) => {
            w.write_u8(254)?;
            w.write_be_u16(len as u16)
        }
        Some(len) => {
            w.write_u8(255)?;
            w.write_be_u32(len)
        }
    }
}

fn read_length(r: &mut Reader<'_>, lvt: u8) -> Result<u32, DecodeError> {
    match lvt {
        0..=4 => Ok(u32::from(lvt)),
        5 => match r.read_u8()? {
            254 => Ok(u32::from(r.read_be_u16()?)),
            255 => r.read_be_u32(),
            short => Ok(u32::from(short)),
        },
        _ => Err(DecodeError::InvalidLength),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppTag, Tag};
    use crate::encoding::{reader::Reader, writer::Writer};

    fn roundtrip(tag: Tag) -> Tag {
        let mut w = Writer::new();
        tag.encode(&mut w).unwrap();
        Tag::decode(&mut Reader::new(w.as_written())).unwrap()
    }

    #[test]
    fn application_and_context_roundtrip() {
        let app = Tag::Application {
            tag: AppTag::UnsignedInt,
            len: 3,
        };
        assert_eq!(roundtrip(app), app);
        let ctx = Tag::Context {
            tag_num: 30,
            len: 300,
        };
        assert_eq!(roundtrip(ctx), ctx);
    }

    #[test]
    fn opening_closing_bytes() {
        let mut w = Writer::new();
        Tag::Opening { tag_num: 3 }.encode(&mut w).unwrap();
        Tag::Closing { tag_num: 3 }.encode(&mut w).unwrap();
        assert_eq!(w.as_written(), &[0x3E, 0x3F]);
    }

    #[test]
    fn application_boolean_value_lives_in_lvt() {
        let mut r = Reader::new(&[0x11]);
        assert_eq!(
            Tag::decode(&mut r).unwrap(),
            Tag::Application {
                tag: AppTag::Boolean,
                len: 1
            }
        );
        assert!(r.is_empty());
    }

    #[test]
    fn peek_helpers_do_not_consume() {
        let r = Reader::new(&[0x1F]);
        assert!(Tag::peek_is_closing(&r, 1));
        assert!(!Tag::peek_is_closing(&r, 0));
        let r = Reader::new(&[0x29, 0x05]);
        assert_eq!(Tag::peek_context(&r), Some(2));
        assert_eq!(r.position(), 0);
    }
}
