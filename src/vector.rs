//! Binary codec for embedding vectors
//!
//! Each element is stored as an 8-byte big-endian IEEE-754 double, in order.
//! Big-endian matches the layout the JVM side of the mod writes with
//! `ByteBuffer`, so existing database files stay readable.

use crate::error::{Result, StoreError};

/// Bytes per encoded element
pub const ELEMENT_SIZE: usize = std::mem::size_of::<f64>();

/// Encode a vector into its blob representation
pub fn encode(vector: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * ELEMENT_SIZE);
    for value in vector {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    bytes
}

/// Decode a blob back into a vector
///
/// Fails with [`StoreError::MalformedVector`] when the length is not a
/// multiple of 8. Dimension consistency is left to the caller.
pub fn decode(bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() % ELEMENT_SIZE != 0 {
        return Err(StoreError::MalformedVector { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(ELEMENT_SIZE)
        .map(|chunk| {
            let mut buf = [0u8; ELEMENT_SIZE];
            buf.copy_from_slice(chunk);
            f64::from_be_bytes(buf)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_length() {
        let vec = vec![1.0, 2.5, -3.14159];
        let bytes = encode(&vec);

        // 3 doubles × 8 bytes
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let vec = vec![
            0.0,
            -0.0,
            1.0,
            -1.5e-300,
            f64::MAX,
            f64::MIN_POSITIVE,
            std::f64::consts::PI,
            0.1 + 0.2,
        ];
        let decoded = decode(&encode(&vec)).unwrap();

        assert_eq!(decoded.len(), vec.len());
        for (original, restored) in vec.iter().zip(decoded.iter()) {
            assert_eq!(original.to_bits(), restored.to_bits());
        }
    }

    #[test]
    fn test_big_endian_layout() {
        let bytes = encode(&[1.0]);
        assert_eq!(bytes, vec![0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_vector() {
        assert!(encode(&[]).is_empty());
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let mut bytes = encode(&[1.0, 2.0]);
        bytes.pop();

        match decode(&bytes) {
            Err(StoreError::MalformedVector { len }) => assert_eq!(len, 15),
            other => panic!("expected MalformedVector, got {:?}", other),
        }
    }
}
