use crate::{BipSettings, ConnectionString};
use thiserror::Error;
use tokio::time::Instant;

/// Errors that can occur at the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame too large")]
    FrameTooLarge,
    #[error("invalid frame")]
    InvalidFrame,
    #[error("unsupported BVLC function 0x{0:02x}")]
    UnsupportedBvlcFunction(u8),
    #[error("bbmd not configured")]
    BbmdNotConfigured,
    #[error("connection string must be 6 bytes, got {0}")]
    InvalidConnectionString(usize),
}

/// Datagram transport driven by the server's tick loop.
///
/// `receive` is a poll: it returns `Ok(None)` as soon as nothing is queued and
/// never waits for traffic.
pub trait Transport {
    /// Copies the next inbound NPDU into `buf`, returning its length and the
    /// peer it came from.
    fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<(usize, ConnectionString)>, TransportError>;

    /// Sends `payload` to `destination`, or to the local broadcast domain when
    /// `broadcast` is set. Returns the number of payload bytes sent.
    async fn send(
        &mut self,
        payload: &[u8],
        destination: ConnectionString,
        broadcast: bool,
    ) -> Result<usize, TransportError>;

    /// Applies newly activated network settings.
    async fn reconfigure(&mut self, _settings: &BipSettings) -> Result<(), TransportError> {
        Ok(())
    }

    /// Periodic housekeeping such as foreign-device re-registration.
    async fn maintain(&mut self, _now: Instant) -> Result<(), TransportError> {
        Ok(())
    }
}
