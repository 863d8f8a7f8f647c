//! Ledger-native identifiers: contract addresses and class hashes

use crate::felt::{Felt, FeltError};
use primitive_types::U256;
use std::fmt;

/// Address of a deployed object on the underlying ledger.
///
/// Always strictly below [`ContractAddress::BOUND`] (`2^251 - 256`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ContractAddress(Felt);

impl ContractAddress {
    /// Exclusive upper bound for contract addresses: `2^251 - 256`
    pub const BOUND: U256 = U256([
        0xffff_ffff_ffff_ff00,
        0xffff_ffff_ffff_ffff,
        0xffff_ffff_ffff_ffff,
        0x07ff_ffff_ffff_ffff,
    ]);

    /// Zero address
    pub const ZERO: ContractAddress = ContractAddress(Felt::ZERO);

    /// Wrap a felt, rejecting values at or above the bound
    pub fn new(felt: Felt) -> Result<Self, FeltError> {
        if felt.to_u256() >= Self::BOUND {
            return Err(FeltError::OutOfRange {
                value: felt.to_hex(),
                bound: "2^251 - 256",
            });
        }
        Ok(ContractAddress(felt))
    }

    /// Reduce an arbitrary felt modulo the bound
    pub fn from_felt_reduced(felt: Felt) -> Self {
        let reduced = felt.to_u256() % Self::BOUND;
        let mut bytes = [0u8; 32];
        reduced.to_big_endian(&mut bytes);
        // reduced < BOUND < P
        ContractAddress(Felt::from_raw(bytes))
    }

    /// Parse from hex
    pub fn from_hex(s: &str) -> Result<Self, FeltError> {
        Self::new(Felt::from_hex(s)?)
    }

    /// Underlying felt
    pub fn felt(&self) -> Felt {
        self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Debug for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractAddress({})", self.to_hex())
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<ContractAddress> for Felt {
    fn from(address: ContractAddress) -> Self {
        address.0
    }
}

impl TryFrom<Felt> for ContractAddress {
    type Error = FeltError;

    fn try_from(felt: Felt) -> Result<Self, Self::Error> {
        ContractAddress::new(felt)
    }
}

/// Content-derived identifier of a declared implementation class.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ClassHash(Felt);

impl ClassHash {
    /// Wrap a felt
    pub const fn new(felt: Felt) -> Self {
        ClassHash(felt)
    }

    /// Parse from hex
    pub fn from_hex(s: &str) -> Result<Self, FeltError> {
        Ok(ClassHash(Felt::from_hex(s)?))
    }

    /// Underlying felt
    pub fn felt(&self) -> Felt {
        self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Debug for ClassHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassHash({})", self.to_hex())
    }
}

impl fmt::Display for ClassHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Felt> for ClassHash {
    fn from(felt: Felt) -> Self {
        ClassHash(felt)
    }
}

impl From<ClassHash> for Felt {
    fn from(hash: ClassHash) -> Self {
        hash.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for ContractAddress {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for ContractAddress {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            ContractAddress::from_hex(&s).map_err(de::Error::custom)
        }
    }

    impl Serialize for ClassHash {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for ClassHash {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            ClassHash::from_hex(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_constant() {
        let expected = (U256::one() << 251) - U256::from(256u64);
        assert_eq!(ContractAddress::BOUND, expected);
    }

    #[test]
    fn test_new_rejects_bound() {
        let mut bytes = [0u8; 32];
        ContractAddress::BOUND.to_big_endian(&mut bytes);
        let felt = Felt::from_be_bytes(bytes).unwrap();
        assert!(ContractAddress::new(felt).is_err());
    }

    #[test]
    fn test_reduction_wraps_at_bound() {
        let mut bytes = [0u8; 32];
        (ContractAddress::BOUND + U256::from(5u64)).to_big_endian(&mut bytes);
        let felt = Felt::from_be_bytes(bytes).unwrap();
        let reduced = ContractAddress::from_felt_reduced(felt);
        assert_eq!(reduced.felt(), Felt::from_u64(5));
    }

    #[test]
    fn test_reduction_keeps_small_values() {
        let felt = Felt::from_u64(12345);
        assert_eq!(ContractAddress::from_felt_reduced(felt).felt(), felt);
    }

    #[test]
    fn test_class_hash_round_trip_hex() {
        let hash = ClassHash::from_hex("0x1234").unwrap();
        assert_eq!(hash.felt(), Felt::from_u64(0x1234));
        assert_eq!(ClassHash::from_hex(&hash.to_hex()).unwrap(), hash);
    }
}
