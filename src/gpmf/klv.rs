//! GPMF key-length-value structure parsing.
//!
//! Every GPMF node is an 8-byte header followed by a payload padded to a
//! 4-byte boundary: a four-character key, a one-byte type identifier
//! (0 marks a nested container), a one-byte structure size and a big-endian
//! 16-bit repeat count. Payload length is structure size times repeat.

use crate::error::{Result, TelemetryError};
use crate::gpmf::stream::GpmfStream;

/// A single parsed GPMF node with a borrowed payload
#[derive(Debug, Clone, Copy)]
pub struct Klv<'a> {
    pub key: [u8; 4],
    pub type_id: u8,
    pub struct_size: u8,
    pub repeat: u16,
    pub payload: &'a [u8],
}

impl<'a> Klv<'a> {
    /// The key as text, for diagnostics
    pub fn key_str(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }

    /// Nested nodes carry a null type identifier
    pub fn is_container(&self) -> bool {
        self.type_id == 0
    }

    /// Parse the payload of a container node into its child nodes
    pub fn children(&self) -> Result<Vec<Klv<'a>>> {
        parse_siblings(self.payload)
    }

    /// Decode the payload as rows of signed integers, one row per repeat.
    ///
    /// Supports the integer GPMF types ('b', 'B', 's', 'S', 'l', 'L'); each
    /// row holds structure-size / element-size values.
    pub fn int_rows(&self) -> Result<Vec<Vec<i64>>> {
        let element_size = match self.type_id {
            b'b' | b'B' => 1,
            b's' | b'S' => 2,
            b'l' | b'L' => 4,
            other => {
                return Err(TelemetryError::InvalidStream(format!(
                    "cannot decode {} payload of type 0x{:02x} as integers",
                    self.key_str(),
                    other
                )))
            }
        };

        let struct_size = self.struct_size as usize;
        if struct_size == 0 || struct_size % element_size != 0 {
            return Err(TelemetryError::InvalidStream(format!(
                "{} structure size {} is not a multiple of element size {}",
                self.key_str(),
                struct_size,
                element_size
            )));
        }

        let columns = struct_size / element_size;
        let mut stream = GpmfStream::new(self.payload);
        let mut rows = Vec::with_capacity(self.repeat as usize);
        for _ in 0..self.repeat {
            let mut row = Vec::with_capacity(columns);
            for _ in 0..columns {
                let value = match self.type_id {
                    b'b' => stream.read_u8()? as i8 as i64,
                    b'B' => stream.read_u8()? as i64,
                    b's' => stream.read_i16_be()? as i64,
                    b'S' => stream.read_u16_be()? as i64,
                    b'l' => stream.read_i32_be()? as i64,
                    b'L' => stream.read_u32_be()? as i64,
                    _ => unreachable!(),
                };
                row.push(value);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Decode the payload as a flat list of signed integers
    pub fn int_values(&self) -> Result<Vec<i64>> {
        Ok(self.int_rows()?.into_iter().flatten().collect())
    }

    /// Decode a 'c' payload as text, trimming trailing NULs
    pub fn as_string(&self) -> Result<String> {
        if self.type_id != b'c' {
            return Err(TelemetryError::InvalidStream(format!(
                "{} payload of type 0x{:02x} is not text",
                self.key_str(),
                self.type_id
            )));
        }
        let text = std::str::from_utf8(self.payload)?;
        Ok(text.trim_end_matches('\0').to_string())
    }
}

/// Parse a run of sibling KLV nodes from `data`.
///
/// Stops at the end of the buffer or at a null key (trailing padding).
pub fn parse_siblings(data: &[u8]) -> Result<Vec<Klv<'_>>> {
    let mut stream = GpmfStream::new(data);
    let mut nodes = Vec::new();

    while stream.remaining() >= 8 {
        let key = stream.read_fourcc()?;
        if key == [0, 0, 0, 0] {
            break;
        }
        let type_id = stream.read_u8()?;
        let struct_size = stream.read_u8()?;
        let repeat = stream.read_u16_be()?;

        let payload_len = struct_size as usize * repeat as usize;
        let payload = stream.read_bytes(payload_len)?;

        // Payloads are padded to 4-byte alignment
        let padding = (4 - payload_len % 4) % 4;
        if padding > 0 && stream.remaining() >= padding {
            stream.skip(padding)?;
        }

        nodes.push(Klv {
            key,
            type_id,
            struct_size,
            repeat,
            payload,
        });
    }

    Ok(nodes)
}

/// Assemble a KLV node with padded payload, for tests
#[cfg(test)]
pub(crate) fn make_klv(
    key: &[u8; 4],
    type_id: u8,
    struct_size: u8,
    repeat: u16,
    payload: &[u8],
) -> Vec<u8> {
    assert_eq!(payload.len(), struct_size as usize * repeat as usize);
    let mut out = Vec::new();
    out.extend_from_slice(key);
    out.push(type_id);
    out.push(struct_size);
    out.extend_from_slice(&repeat.to_be_bytes());
    out.extend_from_slice(payload);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out
}
