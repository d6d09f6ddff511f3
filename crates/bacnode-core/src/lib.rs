//! BACnet object model and wire codecs for a BACnet/IP device server.
//!
//! `bacnode-core` holds the types shared by every bacnode crate: object and
//! property identifiers, the owned [`PropertyValue`](types::PropertyValue)
//! model, the application/context tag codec, NPDU and APDU headers, and the
//! server side of the service codecs (decode requests, encode acknowledgements).
//!
//! # Feature flags
//!
//! - **`serde`**: derives `Serialize`/`Deserialize` on identifiers and values so
//!   they can appear in configuration files.

/// APDU headers for requests, acknowledgements, errors, rejects, and aborts.
pub mod apdu;
/// Byte reader/writer, tag system, and primitive encoders.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// NPDU (Network Protocol Data Unit) encoding and decoding.
pub mod npdu;
/// Server-side BACnet service codecs.
pub mod services;
/// Object identifiers, property identifiers, values, and protocol enumerations.
pub mod types;

pub use error::{DecodeError, EncodeError};
