use crate::apdu::UnconfirmedRequestHeader;
use crate::encoding::{
    primitives::{encode_app_enumerated, encode_app_object_id, encode_app_unsigned},
    writer::Writer,
};
use crate::types::{ObjectId, Segmentation};
use crate::EncodeError;

pub const SERVICE_I_AM: u8 = 0x00;

/// I-Am announcement sent at startup and in answer to Who-Is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IAmRequest {
    pub device_id: ObjectId,
    pub max_apdu: u32,
    pub segmentation: Segmentation,
    pub vendor_id: u32,
}

impl IAmRequest {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        UnconfirmedRequestHeader {
            service_choice: SERVICE_I_AM,
        }
        .encode(w)?;
        encode_app_object_id(w, self.device_id)?;
        encode_app_unsigned(w, self.max_apdu)?;
        encode_app_enumerated(w, self.segmentation.to_u32())?;
        encode_app_unsigned(w, self.vendor_id)
    }
}
