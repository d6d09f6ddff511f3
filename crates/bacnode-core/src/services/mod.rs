pub mod cov_notification;
pub mod device_management;
pub mod i_am;
pub mod read_property;
pub mod read_property_multiple;
pub mod subscribe_cov;
pub mod subscribe_cov_property;
pub mod text_message;
pub mod value_codec;
pub mod who_is;
pub mod write_property;
pub mod write_property_multiple;

use crate::encoding::{reader::Reader, tag::Tag};
use crate::DecodeError;

/// Consumes the opening tag `tag_num` or fails with `InvalidTag`.
pub(crate) fn expect_opening(r: &mut Reader<'_>, tag_num: u8) -> Result<(), DecodeError> {
    if r.is_empty() {
        return Err(DecodeError::MissingParameter);
    }
    match Tag::decode(r)? {
        Tag::Opening { tag_num: n } if n == tag_num => Ok(()),
        _ => Err(DecodeError::InvalidTag),
    }
}

/// Consumes the closing tag `tag_num` or fails with `InvalidTag`.
pub(crate) fn expect_closing(r: &mut Reader<'_>, tag_num: u8) -> Result<(), DecodeError> {
    match Tag::decode(r)? {
        Tag::Closing { tag_num: n } if n == tag_num => Ok(()),
        _ => Err(DecodeError::InvalidTag),
    }
}
