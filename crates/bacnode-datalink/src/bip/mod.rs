/// BVLC header and frame codec.
pub mod bvlc;
/// UDP transport with foreign-device registration.
pub mod transport;
