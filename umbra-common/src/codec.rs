//! Canonical byte codec.
//!
//! All structured data crossing the boundary (and everything whose bytes
//! must be platform-identical, like proof payloads) uses this format:
//! fixed-width fields in declared order, variable-length fields prefixed
//! with a big-endian `u32` length. Decoding is strict: truncation and
//! trailing bytes are both `InvalidInput`.

use crate::{CoreError, CoreResult};

/// Strict reader over a byte buffer.
///
/// Every read fails with `InvalidInput` on underrun; [`Reader::finish`]
/// fails if bytes remain.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_u8(&mut self) -> CoreResult<u8> {
        let bytes = self.take(1, "u8")?;
        Ok(bytes[0])
    }

    pub fn read_u32_be(&mut self) -> CoreResult<u32> {
        let bytes = self.take(4, "u32")?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(arr))
    }

    pub fn read_u64_be(&mut self) -> CoreResult<u64> {
        let bytes = self.take(8, "u64")?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(arr))
    }

    pub fn read_u128_be(&mut self) -> CoreResult<u128> {
        let bytes = self.take(16, "u128")?;
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(u128::from_be_bytes(arr))
    }

    /// Read a fixed 32-byte block (field elements, compressed points, tags).
    pub fn read_array32(&mut self) -> CoreResult<[u8; 32]> {
        let bytes = self.take(32, "32-byte block")?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(arr)
    }

    /// Read a big-endian u32 length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> CoreResult<&'a [u8]> {
        let len = self.read_u32_be()? as usize;
        self.take(len, "length-prefixed bytes")
    }

    pub fn read_exact(&mut self, len: usize) -> CoreResult<&'a [u8]> {
        self.take(len, "fixed-length bytes")
    }

    /// Fail unless the buffer was consumed exactly.
    pub fn finish(self) -> CoreResult<()> {
        if self.pos != self.buf.len() {
            return Err(CoreError::InvalidInput(format!(
                "{} trailing bytes after decoding",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }

    fn take(&mut self, len: usize, what: &str) -> CoreResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(CoreError::InvalidInput(format!(
                "truncated buffer: need {} bytes for {}, have {}",
                len,
                what,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }
}

/// Append-only writer producing the canonical form.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u32_be(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u64_be(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u128_be(&mut self, v: u128) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_array32(&mut self, v: &[u8; 32]) {
        self.buf.extend_from_slice(v);
    }

    /// Write a big-endian u32 length prefix followed by the bytes.
    ///
    /// Lengths above `u32::MAX` cannot occur on the wire; callers hold
    /// buffers already bounded well below that.
    pub fn write_var_bytes(&mut self, v: &[u8]) {
        debug_assert!(v.len() <= u32::MAX as usize);
        self.write_u32_be(v.len() as u32);
        self.buf.extend_from_slice(v);
    }

    pub fn write_raw(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_scalars_and_var_bytes() {
        let mut w = Writer::new();
        w.write_u8(7);
        w.write_u32_be(0xDEAD_BEEF);
        w.write_u64_be(42);
        w.write_u128_be(1 << 100);
        w.write_array32(&[3u8; 32]);
        w.write_var_bytes(b"payload");
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u32_be().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_u64_be().unwrap(), 42);
        assert_eq!(r.read_u128_be().unwrap(), 1 << 100);
        assert_eq!(r.read_array32().unwrap(), [3u8; 32]);
        assert_eq!(r.read_var_bytes().unwrap(), b"payload");
        r.finish().unwrap();
    }

    #[test]
    fn lengths_are_big_endian() {
        let mut w = Writer::new();
        w.write_var_bytes(b"ab");
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn truncated_read_is_invalid_input() {
        let mut r = Reader::new(&[0, 0]);
        let err = r.read_u32_be().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn truncated_var_bytes_is_invalid_input() {
        // Declares 10 bytes, provides 3.
        let mut r = Reader::new(&[0, 0, 0, 10, 1, 2, 3]);
        assert!(matches!(
            r.read_var_bytes().unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut r = Reader::new(&[1, 2]);
        r.read_u8().unwrap();
        assert!(matches!(
            r.finish().unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }
}
