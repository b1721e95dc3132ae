use hex::{decode as hex_decode, encode as hex_encode};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Address length in bytes: one network prefix byte + 20 account bytes.
pub const ADDRESS_SIZE: usize = 21;

/// Network prefix every well-formed address starts with.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Reserved sink for burned fees. No key controls it, so value credited
/// here never moves again through normal operations.
pub const BLACK_HOLE_ADDRESS: Address = Address([
    ADDRESS_PREFIX, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
]);

/// Account address (prefix byte + 20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    /// Build an address from the 20 account bytes, adding the network prefix.
    pub fn from_account_bytes(body: [u8; ADDRESS_SIZE - 1]) -> Self {
        let mut arr = [0u8; ADDRESS_SIZE];
        arr[0] = ADDRESS_PREFIX;
        arr[1..].copy_from_slice(&body);
        Address(arr)
    }

    /// Parse raw bytes; `None` unless the length and prefix are right.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if !is_valid_address(bytes) {
            return None;
        }
        let mut arr = [0u8; ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Some(Address(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex_encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex_decode(s).map_err(|e| AddressParseError(e.to_string()))?;
        Address::from_slice(&bytes).ok_or_else(|| {
            AddressParseError(format!(
                "expected {} bytes with prefix {:#04x}, got {} bytes",
                ADDRESS_SIZE,
                ADDRESS_PREFIX,
                bytes.len()
            ))
        })
    }
}

/// Length and prefix check shared by every actuator.
pub fn is_valid_address(bytes: &[u8]) -> bool {
    bytes.len() == ADDRESS_SIZE && bytes[0] == ADDRESS_PREFIX
}

/// Printable form of possibly malformed address bytes, for error messages.
pub fn readable_address(bytes: &[u8]) -> String {
    hex_encode(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(pub String);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

// Hex text for human-readable formats (TOML, JSON), the raw 21 bytes for
// binary ones (bincode). Both paths re-check the prefix.

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(de::Error::custom)
        } else {
            let raw = <[u8; ADDRESS_SIZE]>::deserialize(deserializer)?;
            Address::from_slice(&raw).ok_or_else(|| {
                de::Error::custom(format!("address must start with {ADDRESS_PREFIX:#04x}"))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_keeps_prefix() {
        let addr = Address::from_account_bytes([0xab; 20]);
        assert_eq!(addr.0[0], ADDRESS_PREFIX);
        let parsed: Address = format!("0x{}", addr.to_hex()).parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn rejects_wrong_prefix_and_length() {
        let mut bytes = [0x11u8; ADDRESS_SIZE];
        assert!(Address::from_slice(&bytes).is_none());
        bytes[0] = ADDRESS_PREFIX;
        assert!(Address::from_slice(&bytes).is_some());
        assert!(Address::from_slice(&bytes[..20]).is_none());
        assert!(Address::from_hex("41zz").is_err());
    }

    #[test]
    fn binary_encoding_is_raw_bytes() {
        let addr = Address::from_account_bytes([0x07; 20]);
        let bytes = bincode::serialize(&addr).unwrap();
        assert_eq!(bytes, addr.to_vec());
        assert_eq!(bincode::deserialize::<Address>(&bytes).unwrap(), addr);

        let mut unprefixed = bytes.clone();
        unprefixed[0] = 0x00;
        assert!(bincode::deserialize::<Address>(&unprefixed).is_err());
    }

    #[test]
    fn display_is_bare_hex() {
        let addr = Address::from_account_bytes([0xab; 20]);
        assert_eq!(addr.to_string(), format!("41{}", "ab".repeat(20)));
        assert_eq!(format!("{addr:?}"), format!("Address({addr})"));
    }

    #[test]
    fn black_hole_is_well_formed() {
        assert!(is_valid_address(BLACK_HOLE_ADDRESS.as_bytes()));
    }
}
