use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_ctx_unsigned, decode_optional_ctx_character_string, decode_optional_ctx_unsigned,
        encode_ctx_character_string, encode_ctx_unsigned,
    },
    reader::Reader,
    writer::Writer,
};
use crate::types::{CommunicationState, ReinitializeState};
use crate::{DecodeError, EncodeError};

pub const SERVICE_DEVICE_COMMUNICATION_CONTROL: u8 = 0x11;
pub const SERVICE_REINITIALIZE_DEVICE: u8 = 0x14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommunicationControlRequest {
    pub duration_minutes: Option<u16>,
    pub enable_disable: CommunicationState,
    pub password: Option<String>,
}

impl DeviceCommunicationControlRequest {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_DEVICE_COMMUNICATION_CONTROL).encode(w)?;
        if let Some(duration) = self.duration_minutes {
            encode_ctx_unsigned(w, 0, u32::from(duration))?;
        }
        encode_ctx_unsigned(w, 1, self.enable_disable.to_u32())?;
        if let Some(password) = &self.password {
            encode_ctx_character_string(w, 2, password)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let duration_minutes = decode_optional_ctx_unsigned(r, 0)?
            .map(|d| u16::try_from(d).map_err(|_| DecodeError::InvalidValue))
            .transpose()?;
        let enable_disable = CommunicationState::from_u32(decode_ctx_unsigned(r, 1)?)
            .ok_or(DecodeError::InvalidValue)?;
        let password = decode_optional_ctx_character_string(r, 2)?;
        Ok(Self {
            duration_minutes,
            enable_disable,
            password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReinitializeDeviceRequest {
    pub state: ReinitializeState,
    pub password: Option<String>,
}

impl ReinitializeDeviceRequest {
    pub fn encode(&self, w: &mut Writer, invoke_id: u8) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(invoke_id, SERVICE_REINITIALIZE_DEVICE).encode(w)?;
        encode_ctx_unsigned(w, 0, self.state.to_u32())?;
        if let Some(password) = &self.password {
            encode_ctx_character_string(w, 1, password)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let state =
            ReinitializeState::from_u32(decode_ctx_unsigned(r, 0)?).ok_or(DecodeError::InvalidValue)?;
        let password = decode_optional_ctx_character_string(r, 1)?;
        Ok(Self { state, password })
    }
}
