//! Document log record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record including this field)
//! +------------------+
//! | Document ID      | (length-prefixed UTF-8)
//! +------------------+
//! | Tombstone Flag   | (u8: 0 = live, 1 = deleted)
//! +------------------+
//! | Document Body    | (length-prefixed JSON bytes, empty for tombstones)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Read};

use super::checksum::compute_checksum;

/// len + id len + tombstone + body len + checksum
const MIN_RECORD_SIZE: usize = 4 + 4 + 1 + 4 + 4;

/// One entry of the append-only document log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub document_id: String,
    pub is_tombstone: bool,
    pub body: Vec<u8>,
}

impl DocumentRecord {
    /// Record carrying the full encoded document
    pub fn live(document_id: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            document_id: document_id.into(),
            is_tombstone: false,
            body,
        }
    }

    /// Record marking the document as deleted
    pub fn tombstone(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            is_tombstone: true,
            body: Vec::new(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let body_len = 4 + self.document_id.len() + 1 + 4 + self.body.len();
        let record_length = (4 + body_len + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());

        record.extend_from_slice(&(self.document_id.len() as u32).to_le_bytes());
        record.extend_from_slice(self.document_id.as_bytes());

        record.push(u8::from(self.is_tombstone));

        record.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        record.extend_from_slice(&self.body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Decode one record from the front of `data`, verifying its checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Record too short: {} bytes", data.len()),
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed = compute_checksum(&data[..checksum_offset]);

        if computed != stored {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, stored
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        let id_bytes = read_prefixed(&mut cursor)?;
        let document_id = String::from_utf8(id_bytes).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
        })?;

        let mut flag = [0u8; 1];
        cursor.read_exact(&mut flag)?;

        let body = read_prefixed(&mut cursor)?;

        Ok((
            Self {
                document_id,
                is_tombstone: flag[0] != 0,
                body,
            },
            record_length,
        ))
    }
}

fn read_prefixed<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
