//! Byte cursor for parsing WKB data.
//!
//! Provides byte-order-aware primitive reads with bounds checking. Each
//! geometry node declares its own byte order, so the order is passed per read
//! rather than fixed for the whole stream.

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};

use crate::error::{EwkbError, EwkbResult};
use crate::types::ByteOrder;

/// A cursor over a WKB byte buffer.
#[derive(Debug)]
pub struct WkbReader<'a> {
    /// The underlying byte data
    data: &'a [u8],
    /// Current byte position
    pos: usize,
}

impl<'a> WkbReader<'a> {
    /// Creates a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Consumes `n` bytes and returns them.
    ///
    /// # Errors
    ///
    /// Returns `EwkbError::Truncated` if fewer than `n` bytes remain. The
    /// cursor does not move on failure.
    fn take(&mut self, n: usize) -> EwkbResult<&'a [u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(EwkbError::Truncated {
                offset: self.pos,
                needed: n,
                remaining,
            });
        }
        let data = self.data;
        let bytes = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> EwkbResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a 32-bit unsigned integer in the given byte order.
    pub fn read_u32(&mut self, order: ByteOrder) -> EwkbResult<u32> {
        let bytes = self.take(4)?;
        Ok(match order {
            ByteOrder::BigEndian => BigEndian::read_u32(bytes),
            ByteOrder::LittleEndian => LittleEndian::read_u32(bytes),
        })
    }

    /// Reads a 64-bit IEEE 754 double in the given byte order.
    ///
    /// The bit pattern is preserved exactly, NaN payloads included.
    pub fn read_f64(&mut self, order: ByteOrder) -> EwkbResult<f64> {
        let bytes = self.take(8)?;
        Ok(match order {
            ByteOrder::BigEndian => BigEndian::read_f64(bytes),
            ByteOrder::LittleEndian => LittleEndian::read_f64(bytes),
        })
    }

    /// Returns true if more bytes are available.
    pub fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns the current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the total number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
