use bacnode_core::encoding::{reader::Reader, writer::Writer};
use bacnode_core::{DecodeError, EncodeError};

pub const BVLC_TYPE_BIP: u8 = 0x81;
pub const BVLC_HEADER_LEN: usize = 4;

/// BVLC-Result codes (Annex J.2.1).
pub const RESULT_SUCCESSFUL_COMPLETION: u16 = 0x0000;
pub const RESULT_REGISTER_FOREIGN_DEVICE_NAK: u16 = 0x0030;
pub const RESULT_DISTRIBUTE_BROADCAST_NAK: u16 = 0x0060;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvlcFunction {
    Result,
    WriteBroadcastDistributionTable,
    ReadBroadcastDistributionTable,
    ReadBroadcastDistributionTableAck,
    ForwardedNpdu,
    RegisterForeignDevice,
    ReadForeignDeviceTable,
    ReadForeignDeviceTableAck,
    DeleteForeignDeviceTableEntry,
    DistributeBroadcastToNetwork,
    OriginalUnicastNpdu,
    OriginalBroadcastNpdu,
    Unknown(u8),
}

impl BvlcFunction {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Result,
            0x01 => Self::WriteBroadcastDistributionTable,
            0x02 => Self::ReadBroadcastDistributionTable,
            0x03 => Self::ReadBroadcastDistributionTableAck,
            0x04 => Self::ForwardedNpdu,
            0x05 => Self::RegisterForeignDevice,
            0x06 => Self::ReadForeignDeviceTable,
            0x07 => Self::ReadForeignDeviceTableAck,
            0x08 => Self::DeleteForeignDeviceTableEntry,
            0x09 => Self::DistributeBroadcastToNetwork,
            0x0A => Self::OriginalUnicastNpdu,
            0x0B => Self::OriginalBroadcastNpdu,
            v => Self::Unknown(v),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Result => 0x00,
            Self::WriteBroadcastDistributionTable => 0x01,
            Self::ReadBroadcastDistributionTable => 0x02,
            Self::ReadBroadcastDistributionTableAck => 0x03,
            Self::ForwardedNpdu => 0x04,
            Self::RegisterForeignDevice => 0x05,
            Self::ReadForeignDeviceTable => 0x06,
            Self::ReadForeignDeviceTableAck => 0x07,
            Self::DeleteForeignDeviceTableEntry => 0x08,
            Self::DistributeBroadcastToNetwork => 0x09,
            Self::OriginalUnicastNpdu => 0x0A,
            Self::OriginalBroadcastNpdu => 0x0B,
            Self::Unknown(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvlcHeader {
    pub function: BvlcFunction,
    pub length: u16,
}

impl BvlcHeader {
    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        w.write_u8(BVLC_TYPE_BIP)?;
        w.write_u8(self.function.to_u8())?;
        w.write_be_u16(self.length)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != BVLC_TYPE_BIP {
            return Err(DecodeError::InvalidValue);
        }
        let function = BvlcFunction::from_u8(r.read_u8()?);
        let length = r.read_be_u16()?;
        if usize::from(length) < BVLC_HEADER_LEN {
            return Err(DecodeError::InvalidLength);
        }
        Ok(Self { function, length })
    }
}

/// Builds a complete BVLC frame from a header function and body parts.
pub fn encode_frame(
    function: BvlcFunction,
    parts: &[&[u8]],
    limit: usize,
) -> Result<Vec<u8>, EncodeError> {
    let body: usize = parts.iter().map(|p| p.len()).sum();
    let length = u16::try_from(BVLC_HEADER_LEN + body).map_err(|_| EncodeError::FrameTooLarge)?;
    let mut w = Writer::with_limit(limit);
    BvlcHeader { function, length }.encode(&mut w)?;
    for part in parts {
        w.write_all(part)?;
    }
    Ok(w.into_bytes())
}

/// Splits a datagram into its BVLC header and body. The header length must
/// match the datagram length.
pub fn decode_frame(datagram: &[u8]) -> Result<(BvlcHeader, &[u8]), DecodeError> {
    let mut r = Reader::new(datagram);
    let header = BvlcHeader::decode(&mut r)?;
    if usize::from(header.length) != datagram.len() {
        return Err(DecodeError::InvalidLength);
    }
    Ok((header, r.rest()))
}

#[cfg(test)]
mod tests {
    use super::{decode_frame, encode_frame, BvlcFunction, BvlcHeader, BVLC_TYPE_BIP};
    use bacnode_core::encoding::reader::Reader;
    use bacnode_core::{DecodeError, EncodeError};

    #[test]
    fn original_unicast_frame_bytes() {
        let frame = encode_frame(BvlcFunction::OriginalUnicastNpdu, &[&[0x01, 0x00]], 64).unwrap();
        assert_eq!(frame, vec![0x81, 0x0A, 0x00, 0x06, 0x01, 0x00]);
        let (header, body) = decode_frame(&frame).unwrap();
        assert_eq!(header.function, BvlcFunction::OriginalUnicastNpdu);
        assert_eq!(body, &[0x01, 0x00]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert_eq!(
            decode_frame(&[BVLC_TYPE_BIP, 0x0A, 0x00, 0x08, 0x01]).unwrap_err(),
            DecodeError::InvalidLength
        );
        assert_eq!(
            decode_frame(&[0x82, 0x0A, 0x00, 0x04]).unwrap_err(),
            DecodeError::InvalidValue
        );
    }

    #[test]
    fn frame_over_limit_fails() {
        let body = [0u8; 32];
        assert_eq!(
            encode_frame(BvlcFunction::OriginalBroadcastNpdu, &[&body], 16).unwrap_err(),
            EncodeError::FrameTooLarge
        );
    }

    #[test]
    fn unknown_function_decodes() {
        let mut r = Reader::new(&[BVLC_TYPE_BIP, 0x99, 0, 4]);
        let decoded = BvlcHeader::decode(&mut r).unwrap();
        assert_eq!(decoded.function, BvlcFunction::Unknown(0x99));
    }
}
