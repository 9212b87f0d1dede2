//! Ethereum-style address and signature helpers
//!
//! Remote parties hand back addresses and signatures as hex strings with an
//! optional `0x` prefix. Checksummed and lowercase forms are both accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TypesError};

/// Length of an Ethereum address in bytes
pub const ETH_ADDRESS_LENGTH: usize = 20;

/// 20-byte Ethereum address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct EthAddress([u8; ETH_ADDRESS_LENGTH]);

impl EthAddress {
    pub const ZERO: EthAddress = EthAddress([0u8; ETH_ADDRESS_LENGTH]);

    pub fn new(bytes: [u8; ETH_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from hex. Shorter inputs are left-padded with zero bytes.
    pub fn from_hex(value: &str) -> Result<Self> {
        let bytes = decode_hex(value)?;
        Self::from_slice(&bytes).map_err(|_| TypesError::InvalidEthAddress(value.to_string()))
    }

    /// Build from raw bytes, left-padding anything shorter than 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > ETH_ADDRESS_LENGTH {
            return Err(TypesError::InvalidEthAddress(hex::encode(bytes)));
        }
        let mut arr = [0u8; ETH_ADDRESS_LENGTH];
        arr[ETH_ADDRESS_LENGTH - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ETH_ADDRESS_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self)
    }
}

/// Strip an optional `0x` / `0X` prefix
pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Decode hex with an optional `0x` prefix
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    hex::decode(strip_hex_prefix(value)).map_err(|e| TypesError::InvalidHex {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Left-pad a hex string with a single `0` nibble when its length is odd.
///
/// Some signers drop the leading zero of the first byte.
pub fn pad_odd_hex(value: &str) -> String {
    let digits = strip_hex_prefix(value);
    if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    }
}

/// Decode a signature, restoring a dropped leading zero nibble first
pub fn decode_signature(value: &str) -> Result<Vec<u8>> {
    decode_hex(&pad_odd_hex(value))
}

/// Case-insensitive address comparison on the hex digits
pub fn same_address(a: &str, b: &str) -> bool {
    strip_hex_prefix(a).eq_ignore_ascii_case(strip_hex_prefix(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_checksummed() {
        let a = EthAddress::from_hex("0x00b6462e955dA5841b6D9e1E2529B830F00f31Bf").unwrap();
        assert_eq!(a.to_string(), "0x00b6462e955da5841b6d9e1e2529b830f00f31bf");
    }

    #[test]
    fn test_from_hex_left_pads() {
        let a = EthAddress::from_hex("0x01").unwrap();
        assert_eq!(a.as_bytes()[19], 1);
        assert!(a.as_bytes()[..19].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_from_hex_too_long() {
        let long = format!("0x{}", "11".repeat(21));
        assert!(EthAddress::from_hex(&long).is_err());
    }

    #[test]
    fn test_pad_odd_hex() {
        assert_eq!(pad_odd_hex("abc"), "0abc");
        assert_eq!(pad_odd_hex("0xabc"), "0abc");
        assert_eq!(pad_odd_hex("abcd"), "abcd");
    }

    #[test]
    fn test_decode_signature_odd_length() {
        let sig = decode_signature("0x1ff").unwrap();
        assert_eq!(sig, vec![0x01, 0xff]);
    }

    #[test]
    fn test_same_address_ignores_case() {
        assert!(same_address(
            "0x00b6462e955dA5841b6D9e1E2529B830F00f31Bf",
            "0x00b6462e955da5841b6d9e1e2529b830f00f31bf"
        ));
        assert!(!same_address("0x01", "0x02"));
    }
}
