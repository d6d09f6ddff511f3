use crate::EncodeError;

/// Largest APDU a BACnet/IP device may accept (B/IP max NPDU minus headers).
pub const MAX_APDU_LEN: usize = 1476;

/// Default frame limit: NPDU header with routing information plus a full APDU.
pub const DEFAULT_FRAME_LIMIT: usize = MAX_APDU_LEN + 21;

/// Byte writer that grows on demand but refuses to exceed a fixed limit,
/// so an oversized response surfaces as [`EncodeError::FrameTooLarge`].
#[derive(Debug, Clone)]
pub struct Writer {
    buf: Vec<u8>,
    limit: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_FRAME_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::with_capacity(limit.min(256)),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_written(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Drops everything written after `len`, used to roll back a partially
    /// encoded element.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodeError> {
        self.write_all(&[value])
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        if self.buf.len().saturating_add(data.len()) > self.limit {
            return Err(EncodeError::FrameTooLarge);
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub fn write_be_u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_be_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_be_u64(&mut self, value: u64) -> Result<(), EncodeError> {
        self.write_all(&value.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::Writer;
    use crate::EncodeError;

    #[test]
    fn writer_appends_values() {
        let mut w = Writer::new();
        w.write_u8(1).unwrap();
        w.write_be_u16(0x0203).unwrap();
        assert_eq!(w.as_written(), &[1, 2, 3]);
    }

    #[test]
    fn writer_enforces_limit() {
        let mut w = Writer::with_limit(2);
        w.write_all(&[1, 2]).unwrap();
        assert_eq!(w.write_u8(3).unwrap_err(), EncodeError::FrameTooLarge);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn truncate_rolls_back() {
        let mut w = Writer::new();
        w.write_all(&[1, 2, 3, 4]).unwrap();
        w.truncate(1);
        assert_eq!(w.into_bytes(), vec![1]);
    }
}
