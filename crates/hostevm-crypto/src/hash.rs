//! Keccak-256 hashing and element chaining

use hostevm_primitives::Felt;
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 truncated to its low 250 bits, as a field element
pub fn truncated_keccak(data: &[u8]) -> Felt {
    Felt::from_truncated_digest(keccak256(data))
}

/// Hash two elements: truncated Keccak of their 64-byte big-endian concatenation.
///
/// Order-sensitive: `hash_pair(a, b) != hash_pair(b, a)` in general.
pub fn hash_pair(a: &Felt, b: &Felt) -> Felt {
    let mut hasher = Keccak256::new();
    hasher.update(a.as_bytes());
    hasher.update(b.as_bytes());
    Felt::from_truncated_digest(hasher.finalize().into())
}

/// Chain-hash a sequence: `h(h(...h(0, e1)..., en), n)`.
///
/// Appending the length keeps `[x]` and `[x, 0]`-style prefixes apart.
pub fn hash_on_elements(elements: &[Felt]) -> Felt {
    let acc = elements
        .iter()
        .fold(Felt::ZERO, |acc, element| hash_pair(&acc, element));
    hash_pair(&acc, &Felt::from_u64(elements.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        // keccak256("") = 0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_hello() {
        assert_eq!(
            hex::encode(keccak256(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_truncated_keccak_clears_top_bits() {
        // 0xc5 & 0x03 = 0x01
        let felt = truncated_keccak(&[]);
        assert_eq!(felt.as_bytes()[0], 0x01);
        assert_eq!(&felt.as_bytes()[1..], &keccak256(&[])[1..]);
    }

    #[test]
    fn test_hash_pair_is_order_sensitive() {
        let a = Felt::from_u64(1);
        let b = Felt::from_u64(2);
        assert_ne!(hash_pair(&a, &b), hash_pair(&b, &a));
        assert_eq!(hash_pair(&a, &b), hash_pair(&a, &b));
    }

    #[test]
    fn test_hash_on_elements_empty_is_hash_of_zero_and_length() {
        assert_eq!(hash_on_elements(&[]), hash_pair(&Felt::ZERO, &Felt::ZERO));
    }

    #[test]
    fn test_hash_on_elements_length_sensitive() {
        let one = Felt::ONE;
        assert_ne!(
            hash_on_elements(&[one]),
            hash_on_elements(&[one, Felt::ZERO])
        );
    }
}
