/// Encode/decode functions for BACnet primitive and application data types.
pub mod primitives;
/// Byte reader over a received frame.
pub mod reader;
/// BACnet tag system (application, context, opening/closing).
pub mod tag;
/// Growable, length-limited byte writer for outgoing frames.
pub mod writer;
