//! Field-level framing.
//!
//! Every multi-byte integer on the wire is big-endian, every string is a
//! `u32` byte length followed by the raw bytes, and nothing is padded.
//! [`FrameWriter`] builds command bodies, [`FrameReader`] walks response
//! bodies without ever stepping past their end.
use std::io::Read;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::ProtocolError;

use super::{
    transport::TransportError,
    wide::{
        decode_f32_bits, decode_i64, decode_u64, encode_f32_bits, encode_i64, encode_u64,
        fix_unsigned_32,
    },
};

#[derive(Debug, Default)]
pub struct FrameWriter {
    buf: BytesMut,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn put_u16(&mut self, v: u16) -> &mut Self {
        self.buf.put_u16(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.put_u32(v);
        self
    }

    pub fn put_bool(&mut self, v: bool) -> &mut Self {
        self.put_u32(u32::from(v))
    }

    pub fn put_u64(&mut self, v: u64) -> &mut Self {
        self.buf.put_slice(&encode_u64(v));
        self
    }

    pub fn put_i64(&mut self, v: i64) -> &mut Self {
        self.buf.put_slice(&encode_i64(v));
        self
    }

    pub fn put_f32(&mut self, v: f32) -> &mut Self {
        self.buf.put_slice(&encode_f32_bits(v));
        self
    }

    /// Writes a `u32` length prefix followed by the raw bytes.
    pub fn put_str(&mut self, s: impl AsRef<[u8]>) -> &mut Self {
        let s = s.as_ref();
        self.buf.put_u32(s.len() as u32);
        self.buf.put_slice(s);
        self
    }

    pub fn put_slice(&mut self, raw: &[u8]) -> &mut Self {
        self.buf.put_slice(raw);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Bounded cursor over a response body.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            len: buf.len(),
        }
    }

    pub fn position(&self) -> usize {
        self.len - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() < needed {
            return Err(ProtocolError::Truncated {
                offset: self.position(),
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn i32(&mut self) -> Result<i32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn u32(&mut self) -> Result<u32, ProtocolError> {
        self.i32().map(fix_unsigned_32)
    }

    pub fn u64(&mut self) -> Result<u64, ProtocolError> {
        let mut raw = [0; 8];
        self.ensure(8)?;
        self.buf.copy_to_slice(&mut raw);
        Ok(decode_u64(&raw))
    }

    pub fn i64(&mut self) -> Result<i64, ProtocolError> {
        let mut raw = [0; 8];
        self.ensure(8)?;
        self.buf.copy_to_slice(&mut raw);
        Ok(decode_i64(&raw))
    }

    pub fn f32(&mut self) -> Result<f32, ProtocolError> {
        let mut raw = [0; 4];
        self.ensure(4)?;
        self.buf.copy_to_slice(&mut raw);
        Ok(decode_f32_bits(&raw))
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        self.ensure(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Reads a length-prefixed byte string.
    pub fn prefixed(&mut self) -> Result<&'a [u8], ProtocolError> {
        let n = self.u32()? as usize;
        self.bytes(n)
    }

    /// Reads a length-prefixed string, replacing invalid UTF-8.
    pub fn string(&mut self) -> Result<String, ProtocolError> {
        Ok(String::from_utf8_lossy(self.prefixed()?).into_owned())
    }

    /// Consumes and returns everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }
}

/// Reads exactly `len` bytes, looping over partial reads. Running out of
/// input first is a [`TransportError::ShortRead`].
pub fn read_full<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, TransportError> {
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    let read = reader.take(len as u64).read_to_end(&mut buf)?;

    if read < len {
        return Err(TransportError::ShortRead {
            expected: len,
            actual: read,
            partial: buf,
        });
    }
    Ok(buf)
}
