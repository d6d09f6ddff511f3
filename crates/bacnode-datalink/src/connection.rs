use core::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::TransportError;

/// BACnet/IP peer address: four IPv4 octets followed by the big-endian UDP
/// port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionString([u8; 6]);

impl ConnectionString {
    pub const LEN: usize = 6;

    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        let [a, b, c, d] = ip.octets();
        let [hi, lo] = port.to_be_bytes();
        Self([a, b, c, d, hi, lo])
    }

    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.0[0], self.0[1], self.0[2], self.0[3])
    }

    pub fn port(&self) -> u16 {
        u16::from_be_bytes([self.0[4], self.0[5]])
    }

    pub fn to_socket_addr(self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip(), self.port())
    }

    /// Converts an IPv4 socket address; IPv6 peers have no BACnet/IP form.
    pub fn from_socket_addr(addr: SocketAddr) -> Option<Self> {
        match addr {
            SocketAddr::V4(v4) => Some(Self::from(v4)),
            SocketAddr::V6(_) => None,
        }
    }
}

impl From<SocketAddrV4> for ConnectionString {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

impl From<ConnectionString> for SocketAddrV4 {
    fn from(conn: ConnectionString) -> Self {
        conn.to_socket_addr()
    }
}

impl TryFrom<&[u8]> for ConnectionString {
    type Error = TransportError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 6]>::try_from(bytes)
            .map(Self)
            .map_err(|_| TransportError::InvalidConnectionString(bytes.len()))
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip(), self.port())
    }
}

/// Subnet-directed broadcast address: `ip | !mask`.
pub fn directed_broadcast(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(mask))
}
