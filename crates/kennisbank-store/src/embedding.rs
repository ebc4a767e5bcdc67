//! Embedding vector BLOB codec.
//!
//! Vectors are stored as little-endian f32 bytes. The round-trip is exact;
//! similarity scores computed from fetched vectors match the ones the
//! ingestion side would compute from the originals.

use ndarray::Array1;

/// Encode a float32 embedding as little-endian bytes.
pub fn encode_embedding(embedding: &Array1<f32>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &v in embedding.iter() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode little-endian f32 bytes back into an embedding.
/// Trailing bytes that do not form a full f32 are ignored.
pub fn decode_embedding(bytes: &[u8]) -> Array1<f32> {
    Array1::from_iter(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_roundtrip_exact() {
        let original = array![0.1f32, 0.5, -0.3, 0.8, -0.1, 1e-7, -1e30];
        let bytes = encode_embedding(&original);
        let restored = decode_embedding(&bytes);

        assert_eq!(original.len(), restored.len());
        for (a, b) in original.iter().zip(restored.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_empty_vector() {
        let original = Array1::<f32>::zeros(0);
        let bytes = encode_embedding(&original);
        assert!(bytes.is_empty());
        assert_eq!(decode_embedding(&bytes).len(), 0);
    }

    #[test]
    fn test_truncated_bytes_ignored() {
        let original = array![1.0f32, 2.0];
        let mut bytes = encode_embedding(&original);
        bytes.push(0xFF);
        let restored = decode_embedding(&bytes);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0], 1.0);
        assert_eq!(restored[1], 2.0);
    }
}
