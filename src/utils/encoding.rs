use crate::error::{IndexError, Result};

/// Append an i32 in little-endian format
pub fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append an i64 in little-endian format
pub fn put_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a string as `[i32 byte length][utf-8 bytes]`
pub fn put_prefixed_str(buf: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    put_i32(buf, bytes.len() as i32);
    buf.extend_from_slice(bytes);
}

/// Bounds-checked reader over one region of the store.
///
/// Every read that would run past the end of the buffer, or that meets a
/// negative length, fails with [`IndexError::Corrupted`] naming the region
/// and the absolute offset of the bad read.
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Absolute offset of `buf[0]` inside its region, for error reporting
    base: usize,
    region: &'static str,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8], region: &'static str) -> Self {
        Self::at(buf, region, 0)
    }

    /// Cursor over a sub-slice that starts at `base` within its region
    pub fn at(buf: &'a [u8], region: &'static str, base: usize) -> Self {
        Self {
            buf,
            pos: 0,
            base,
            region,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn error(&self, reason: impl Into<String>) -> IndexError {
        IndexError::corrupted(self.region, self.base + self.pos, reason)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(format!(
                "need {} bytes, {} remain",
                len,
                self.remaining()
            )));
        }
        let buf: &'a [u8] = self.buf;
        let slice = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }

    /// Read an i32 that must be a non-negative length or count
    pub fn read_len(&mut self) -> Result<usize> {
        let value = self.read_i32()?;
        if value < 0 {
            return Err(self.error(format!("negative length {}", value)));
        }
        Ok(value as usize)
    }

    pub fn read_str(&mut self, len: usize) -> Result<&'a str> {
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|e| {
            IndexError::corrupted(self.region, self.base + start, format!("invalid utf-8: {}", e))
        })
    }

    /// Read an `[i32 byte length][utf-8 bytes]` string
    pub fn read_prefixed_str(&mut self) -> Result<&'a str> {
        let len = self.read_len()?;
        self.read_str(len)
    }
}
