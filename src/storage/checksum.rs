//! CRC32 checksums for log records
//!
//! Every record in the document log carries a CRC32 (IEEE) over all of its
//! preceding bytes. A mismatch on replay aborts the open.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_stable() {
        let data = br#"{"id":"doc-1","title":"hello"}"#;
        assert_eq!(compute_checksum(data), compute_checksum(data));
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let mut data = br#"{"id":"doc-1"}"#.to_vec();
        let original = compute_checksum(&data);
        data[4] ^= 0x01;
        assert_ne!(original, compute_checksum(&data));
    }
}
