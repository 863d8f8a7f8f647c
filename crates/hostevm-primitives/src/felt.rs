//! Ledger field element

use crate::address::Address;
use primitive_types::U256;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Field element parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeltError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid felt length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        got: usize,
    },
    /// Value does not fit below the bound
    #[error("value {value} is not below {bound}")]
    OutOfRange {
        /// Offending value (hex)
        value: String,
        /// Exclusive upper bound it violated
        bound: &'static str,
    },
    /// Short string is longer than 31 bytes or not ASCII
    #[error("invalid short string: {0}")]
    InvalidShortString(String),
}

/// Element of the ledger's prime field, `0 <= value < P` with
/// `P = 2^251 + 17 * 2^192 + 1`.
///
/// Stored as 32 big-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Felt([u8; 32]);

impl Felt {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero
    pub const ZERO: Felt = Felt([0u8; 32]);

    /// One
    pub const ONE: Felt = Felt::from_u64(1);

    /// Field prime `2^251 + 17 * 2^192 + 1`
    pub const PRIME: U256 = U256([1, 0, 0, 0x0800_0000_0000_0011]);

    /// Create from a `u64`
    pub const fn from_u64(value: u64) -> Self {
        let be = value.to_be_bytes();
        let mut bytes = [0u8; 32];
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = be[i];
            i += 1;
        }
        Felt(bytes)
    }

    /// Create from a `u128`
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Felt(bytes)
    }

    /// Create from big-endian bytes, rejecting values `>= P`
    pub fn from_be_bytes(bytes: [u8; 32]) -> Result<Self, FeltError> {
        let value = U256::from_big_endian(&bytes);
        if value >= Self::PRIME {
            return Err(FeltError::OutOfRange {
                value: format!("0x{}", hex::encode(bytes)),
                bound: "P",
            });
        }
        Ok(Felt(bytes))
    }

    /// Create from a slice of exactly 32 big-endian bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, FeltError> {
        if slice.len() != Self::LEN {
            return Err(FeltError::InvalidLength {
                expected: Self::LEN,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Self::from_be_bytes(bytes)
    }

    /// Parse from a hex string (with or without 0x prefix).
    ///
    /// Leading zeros may be omitted, so `"0x1"` is one.
    pub fn from_hex(s: &str) -> Result<Self, FeltError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() {
            return Err(FeltError::InvalidHex("empty string".into()));
        }
        let padded = if s.len() % 2 == 1 {
            format!("0{}", s)
        } else {
            s.to_string()
        };
        let decoded = hex::decode(&padded).map_err(|e| FeltError::InvalidHex(e.to_string()))?;
        if decoded.len() > Self::LEN {
            return Err(FeltError::InvalidLength {
                expected: Self::LEN,
                got: decoded.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes[Self::LEN - decoded.len()..].copy_from_slice(&decoded);
        Self::from_be_bytes(bytes)
    }

    /// Encode a short ASCII string (at most 31 bytes) as a big-endian integer
    pub fn from_short_string(s: &str) -> Result<Self, FeltError> {
        if s.len() > 31 || !s.is_ascii() {
            return Err(FeltError::InvalidShortString(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        bytes[Self::LEN - s.len()..].copy_from_slice(s.as_bytes());
        Ok(Felt(bytes))
    }

    /// Const form of [`Felt::from_short_string`] for compile-time constants.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `s` is longer than 31 bytes.
    pub const fn from_short_str_const(s: &str) -> Self {
        let src = s.as_bytes();
        assert!(src.len() <= 31, "short string longer than 31 bytes");
        let mut bytes = [0u8; 32];
        let offset = 32 - src.len();
        let mut i = 0;
        while i < src.len() {
            bytes[offset + i] = src[i];
            i += 1;
        }
        Felt(bytes)
    }

    /// Keep the low 250 bits of a 32-byte digest.
    ///
    /// The result is below `2^250`, hence always a valid element.
    pub fn from_truncated_digest(mut digest: [u8; 32]) -> Self {
        digest[0] &= 0x03;
        Felt(digest)
    }

    /// Wrap bytes already known to encode a value below `P`
    pub(crate) const fn from_raw(bytes: [u8; 32]) -> Self {
        Felt(bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a 256-bit integer
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({})", self.to_hex())
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Felt {
    type Err = FeltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Felt::from_u64(value)
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Felt::from_u128(value)
    }
}

impl From<Address> for Felt {
    /// An emulated address as a big-endian integer; 160 bits always fit.
    fn from(address: Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        Felt(bytes)
    }
}

impl TryFrom<U256> for Felt {
    type Error = FeltError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        Felt::from_be_bytes(bytes)
    }
}

impl AsRef<[u8]> for Felt {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Felt {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Felt {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Felt::from_hex(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prime_bytes() -> [u8; 32] {
        let mut bytes = [0u8; 32];
        Felt::PRIME.to_big_endian(&mut bytes);
        bytes
    }

    #[test]
    fn test_prime_constant() {
        let expected = (U256::one() << 251) + (U256::from(17u64) << 192) + U256::one();
        assert_eq!(Felt::PRIME, expected);
    }

    #[test]
    fn test_from_be_bytes_rejects_prime() {
        let result = Felt::from_be_bytes(prime_bytes());
        assert!(matches!(result, Err(FeltError::OutOfRange { .. })));
    }

    #[test]
    fn test_from_be_bytes_accepts_prime_minus_one() {
        let mut bytes = prime_bytes();
        bytes[31] -= 1;
        let felt = Felt::from_be_bytes(bytes).unwrap();
        assert_eq!(felt.to_u256(), Felt::PRIME - U256::one());
    }

    #[test]
    fn test_from_slice_requires_exact_width() {
        assert_eq!(
            Felt::from_slice(&[1u8; 31]),
            Err(FeltError::InvalidLength { expected: 32, got: 31 })
        );
        assert_eq!(
            Felt::from_slice(&[0u8; 33]),
            Err(FeltError::InvalidLength { expected: 32, got: 33 })
        );
    }

    #[test]
    fn test_from_hex_short_form() {
        assert_eq!(Felt::from_hex("0x1").unwrap(), Felt::ONE);
        assert_eq!(Felt::from_hex("ff").unwrap(), Felt::from_u64(255));
        assert!(Felt::from_hex("0x").is_err());
        assert!(Felt::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_short_string_encoding() {
        // "ETH" = 0x455448
        assert_eq!(Felt::from_short_string("ETH").unwrap(), Felt::from_u64(0x455448));
        assert!(Felt::from_short_string(&"x".repeat(32)).is_err());
    }

    #[test]
    fn test_from_address() {
        let address = Address::from_low_u64(0xabcd);
        assert_eq!(Felt::from(address), Felt::from_u64(0xabcd));
    }

    #[test]
    fn test_u128_and_u64_agree() {
        assert_eq!(Felt::from_u128(42), Felt::from_u64(42));
    }

    #[test]
    fn test_try_from_u256() {
        assert_eq!(Felt::try_from(U256::from(7u64)).unwrap(), Felt::from_u64(7));
        assert!(Felt::try_from(Felt::PRIME).is_err());
    }
}
