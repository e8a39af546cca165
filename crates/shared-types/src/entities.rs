//! # Core Entities
//!
//! Primitive identities and values used by every oracle subsystem.

use sha3::{Digest, Keccak256};
use thiserror::Error;

// Re-export U256 from primitive-types; prices are 256-bit like the on-chain original.
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address identifying a reporter.
pub type Address = [u8; 20];

/// Seconds since UNIX epoch.
pub type Timestamp = u64;

/// Asset identifier as understood by the price source (e.g. `"ethereum"`).
pub type AssetId = String;

/// Longest asset identifier the oracle accepts, in bytes.
pub const MAX_ASSET_LEN: usize = 64;

/// Fixed-point price with [`PRICE_DECIMALS`] implied decimals.
pub type Price = U256;

/// Number of implied decimal digits in a reported [`Price`].
pub const PRICE_DECIMALS: u32 = 8;

/// Errors from parsing textual identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The decoded value has the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Renders an address as `0x`-prefixed lowercase hex.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Renders the first four bytes of an address, for compact log prefixes.
pub fn short_address(address: &Address) -> String {
    format!("0x{}", hex::encode(&address[..4]))
}

/// Renders a hash as `0x`-prefixed lowercase hex.
pub fn format_hash(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parses a `0x`-prefixed (or bare) hex address.
pub fn parse_address(input: &str) -> Result<Address, ParseError> {
    decode_fixed::<20>(input)
}

/// Parses a `0x`-prefixed (or bare) hex hash.
pub fn parse_hash(input: &str) -> Result<Hash, ParseError> {
    decode_fixed::<32>(input)
}

pub(crate) fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], ParseError> {
    let trimmed = input.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(stripped).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ParseError::InvalidLength {
            expected: N,
            actual,
        })
}

/// Serde adapter rendering fixed-size byte arrays as `0x`-prefixed hex.
///
/// Use with `#[serde(with = "shared_types::hex_bytes")]`.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::decode_fixed::<N>(&text).map_err(serde::de::Error::custom)
    }
}

/// Current wall-clock time in seconds.
pub fn unix_now() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrip_through_hex() {
        let address: Address = [0xAB; 20];
        let text = format_address(&address);
        assert!(text.starts_with("0xabab"));
        assert_eq!(parse_address(&text).unwrap(), address);
    }

    #[test]
    fn test_parse_address_without_prefix() {
        let parsed = parse_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        assert_eq!(parsed[0], 0xf3);
        assert_eq!(parsed[19], 0x66);
    }

    #[test]
    fn test_parse_address_wrong_length() {
        let err = parse_address("0xabcd").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
    }

    #[test]
    fn test_parse_hash_rejects_garbage() {
        assert!(matches!(
            parse_hash("0xzz"),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address(&[0x12; 20]), "0x12121212");
    }

    #[test]
    fn test_hex_bytes_serde() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(with = "hex_bytes")]
            address: Address,
        }

        let value = Wrapper { address: [0x0f; 20] };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, format!("{{\"address\":\"0x{}\"}}", "0f".repeat(20)));
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), value);
    }

    #[test]
    fn test_keccak_empty_input() {
        // Well-known Keccak-256 of the empty string.
        assert_eq!(
            format_hash(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
