//! Forward-only byte cursors for the little-endian wire format

use crate::error::DecodeError;
use crate::{PhysicalState, Vector2};

/// Reads fixed-width little-endian fields and NUL-terminated strings
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let remaining = self.remaining();
        if remaining < N {
            return Err(DecodeError::Truncated {
                needed: N - remaining,
                remaining,
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_f32_le(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_vec2_le(&mut self) -> Result<Vector2, DecodeError> {
        let x = self.read_f32_le()?;
        let y = self.read_f32_le()?;
        Ok(Vector2 { x, y })
    }

    pub fn read_physical_state_le(&mut self) -> Result<PhysicalState, DecodeError> {
        let position = self.read_vec2_le()?;
        let velocity = self.read_vec2_le()?;
        Ok(PhysicalState { position, velocity })
    }

    /// Reads bytes up to a NUL terminator and decodes them as UTF-8.
    ///
    /// The terminator is consumed but not returned. A string that runs off
    /// the end of the frame is reported as truncated.
    pub fn read_cstring(&mut self) -> Result<String, DecodeError> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(DecodeError::Truncated {
                needed: 1,
                remaining: rest.len(),
            });
        };
        let text = std::str::from_utf8(&rest[..len]).map_err(|_| DecodeError::InvalidEncoding)?;
        self.pos += len + 1;
        Ok(text.to_owned())
    }
}

/// Builds outbound frames with the same field encodings `ByteReader` reads
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_f32_le(&mut self, value: f32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_vec2_le(&mut self, value: Vector2) -> &mut Self {
        self.write_f32_le(value.x).write_f32_le(value.y)
    }

    pub fn write_physical_state_le(&mut self, value: PhysicalState) -> &mut Self {
        self.write_vec2_le(value.position)
            .write_vec2_le(value.velocity)
    }

    pub fn write_cstring(&mut self, value: &str) -> &mut Self {
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
