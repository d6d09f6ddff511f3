//! BACnet/IP datagram transport for bacnode.
//!
//! [`BipTransport`] wraps a non-blocking tokio UDP socket with BVLC framing,
//! directed broadcasts, and foreign-device registration. Peers are identified
//! by their 6-byte [`ConnectionString`].
#![allow(async_fn_in_trait)]

pub mod bip;
pub mod connection;
pub mod traits;

pub use bip::transport::{BipSettings, BipTransport, ForeignDevice, Registration};
pub use connection::{directed_broadcast, ConnectionString};
pub use traits::{Transport, TransportError};
