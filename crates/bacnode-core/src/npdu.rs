use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnet network layer protocol version (always `0x01`).
pub const NPDU_VERSION: u8 = 0x01;

/// DNET value addressing every network.
pub const GLOBAL_NETWORK: u16 = 0xFFFF;

const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
const CONTROL_DESTINATION: u8 = 0x20;
const CONTROL_SOURCE: u8 = 0x08;
const CONTROL_EXPECTING_REPLY: u8 = 0x04;

/// Remote network address (DNET/DADR or SNET/SADR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpduAddress {
    pub network: u16,
    /// MAC bytes; empty for a broadcast on `network`.
    pub mac: Vec<u8>,
}

/// BACnet NPDU header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npdu {
    pub control: u8,
    pub destination: Option<NpduAddress>,
    pub source: Option<NpduAddress>,
    pub hop_count: Option<u8>,
    pub message_type: Option<u8>,
    pub vendor_id: Option<u16>,
}

impl Npdu {
    pub const fn new(control: u8) -> Self {
        Self {
            control,
            destination: None,
            source: None,
            hop_count: None,
            message_type: None,
            vendor_id: None,
        }
    }

    /// Header for an application-layer message sent on the local network.
    pub const fn local(expecting_reply: bool) -> Self {
        Self::new(if expecting_reply {
            CONTROL_EXPECTING_REPLY
        } else {
            0
        })
    }

    /// Header for an unconfirmed message to `destination`, or to the local
    /// network when there is none.
    pub fn routed(destination: Option<NpduAddress>) -> Self {
        match destination {
            Some(destination) => Self {
                control: CONTROL_DESTINATION,
                destination: Some(destination),
                hop_count: Some(255),
                ..Self::new(0)
            },
            None => Self::new(0),
        }
    }

    /// Header for a broadcast that routers forward to every network.
    pub fn global_broadcast() -> Self {
        Self::routed(Some(NpduAddress {
            network: GLOBAL_NETWORK,
            mac: Vec::new(),
        }))
    }

    /// Header for the answer to `request`. A request that arrived through a
    /// router carries its SNET/SADR, which becomes the reply's destination.
    pub fn reply_to(request: &Npdu) -> Self {
        Self::routed(request.source.clone())
    }

    pub fn is_network_message(&self) -> bool {
        self.control & CONTROL_NETWORK_MESSAGE != 0
    }

    pub fn expecting_reply(&self) -> bool {
        self.control & CONTROL_EXPECTING_REPLY != 0
    }

    /// Whether a device on the local network should process this NPDU.
    pub fn is_for_local_device(&self) -> bool {
        match &self.destination {
            None => true,
            Some(dest) => dest.network == GLOBAL_NETWORK,
        }
    }

    pub fn encode(&self, w: &mut Writer) -> Result<(), EncodeError> {
        let mut control = self.control & !(CONTROL_DESTINATION | CONTROL_SOURCE);
        if self.destination.is_some() {
            control |= CONTROL_DESTINATION;
        }
        if self.source.is_some() {
            control |= CONTROL_SOURCE;
        }
        w.write_u8(NPDU_VERSION)?;
        w.write_u8(control)?;

        if let Some(dest) = &self.destination {
            encode_addr(w, dest)?;
        }
        if let Some(src) = &self.source {
            encode_addr(w, src)?;
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count.unwrap_or(255))?;
        }
        if control & CONTROL_NETWORK_MESSAGE != 0 {
            w.write_u8(self.message_type.unwrap_or(0))?;
            if matches!(self.message_type, Some(0x80..=0xFF)) {
                w.write_be_u16(self.vendor_id.unwrap_or(0))?;
            }
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != NPDU_VERSION {
            return Err(DecodeError::InvalidValue);
        }

        let control = r.read_u8()?;
        let destination = if control & CONTROL_DESTINATION != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let source = if control & CONTROL_SOURCE != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let hop_count = if destination.is_some() {
            Some(r.read_u8()?)
        } else {
            None
        };

        let (message_type, vendor_id) = if control & CONTROL_NETWORK_MESSAGE != 0 {
            let mt = r.read_u8()?;
            let vid = if mt >= 0x80 {
                Some(r.read_be_u16()?)
            } else {
                None
            };
            (Some(mt), vid)
        } else {
            (None, None)
        };

        Ok(Self {
            control,
            destination,
            source,
            hop_count,
            message_type,
            vendor_id,
        })
    }
}

fn encode_addr(w: &mut Writer, addr: &NpduAddress) -> Result<(), EncodeError> {
    let len = u8::try_from(addr.mac.len()).map_err(|_| EncodeError::InvalidLength)?;
    w.write_be_u16(addr.network)?;
    w.write_u8(len)?;
    w.write_all(&addr.mac)
}

fn decode_addr(r: &mut Reader<'_>) -> Result<NpduAddress, DecodeError> {
    let network = r.read_be_u16()?;
    let len = r.read_u8()?;
    let mac = r.read_exact(usize::from(len))?.to_vec();
    Ok(NpduAddress { network, mac })
}
