use std::fmt;
use std::net::Ipv4Addr;

/// Host part of a BACnetHostNPort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostAddress {
    #[default]
    None,
    Ip(Ipv4Addr),
    Name(String),
}

/// A BACnetHostNPort, used for the BBMD a foreign device registers with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostNPort {
    pub host: HostAddress,
    pub port: u16,
}

impl HostNPort {
    pub const fn ip(addr: Ipv4Addr, port: u16) -> Self {
        Self {
            host: HostAddress::Ip(addr),
            port,
        }
    }

    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.host {
            HostAddress::Ip(addr) => Some(addr),
            _ => None,
        }
    }
}

impl fmt::Display for HostNPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            HostAddress::None => write!(f, "<none>:{}", self.port),
            HostAddress::Ip(addr) => write!(f, "{addr}:{}", self.port),
            HostAddress::Name(name) => write!(f, "{name}:{}", self.port),
        }
    }
}
