//! Minimal Solidity ABI support for the Catalyst registry calls
//!
//! Covers exactly what the registry needs: 4-byte selectors, `uint256` and
//! `bytes32` arguments, and decoding of `uint256`, `bytes32` and the
//! `(bytes32, address, string)` catalyst record.

use sha3::{Digest, Keccak256};

use crate::error::CatalystError;
use crate::Result;

const WORD: usize = 32;

/// 4-byte function selector: first bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Left-pad a `u64` into a `uint256` word.
pub fn encode_uint(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// `0x`-prefixed calldata for `signature` with static word arguments.
pub fn encode_call(signature: &str, args: &[[u8; WORD]]) -> String {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(arg);
    }
    format!("0x{}", hex::encode(data))
}

/// Decode a `0x`-prefixed hex string returned by the node.
pub fn decode_hex(data: &str) -> Result<Vec<u8>> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| CatalystError::Abi(format!("invalid hex return data: {e}")))
}

fn word(data: &[u8], index: usize) -> Result<&[u8]> {
    let start = index * WORD;
    data.get(start..start + WORD).ok_or_else(|| {
        CatalystError::Abi(format!(
            "return data too short: need word {index}, have {} bytes",
            data.len()
        ))
    })
}

fn word_as_usize(word: &[u8]) -> Result<usize> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(CatalystError::Abi("integer does not fit in 64 bits".into()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf))
        .map_err(|_| CatalystError::Abi("integer does not fit in usize".into()))
}

/// Decode a single `uint256` return value that must fit in a `u64`.
pub fn decode_uint(data: &[u8]) -> Result<u64> {
    let w = word(data, 0)?;
    let (high, low) = w.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(CatalystError::Abi("uint256 does not fit in 64 bits".into()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    Ok(u64::from_be_bytes(buf))
}

/// Decode a single `bytes32` return value.
pub fn decode_bytes32(data: &[u8]) -> Result<[u8; WORD]> {
    let mut out = [0u8; WORD];
    out.copy_from_slice(word(data, 0)?);
    Ok(out)
}

/// A registry record as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalystRecord {
    pub id: [u8; WORD],
    pub owner: [u8; 20],
    pub domain: String,
}

impl CatalystRecord {
    pub fn id_hex(&self) -> String {
        format!("0x{}", hex::encode(self.id))
    }

    pub fn owner_hex(&self) -> String {
        format!("0x{}", hex::encode(self.owner))
    }
}

/// Decode the `(bytes32 id, address owner, string domain)` record.
pub fn decode_catalyst(data: &[u8]) -> Result<CatalystRecord> {
    let id = decode_bytes32(data)?;

    let owner_word = word(data, 1)?;
    if owner_word[..12].iter().any(|b| *b != 0) {
        return Err(CatalystError::Abi("owner is not a padded address".into()));
    }
    let mut owner = [0u8; 20];
    owner.copy_from_slice(&owner_word[12..]);

    let offset = word_as_usize(word(data, 2)?)?;
    let len_word = data
        .get(offset..offset.saturating_add(WORD))
        .ok_or_else(|| CatalystError::Abi(format!("string offset {offset} out of range")))?;
    let len = word_as_usize(len_word)?;
    let start = offset + WORD;
    let bytes = data
        .get(start..start.saturating_add(len))
        .ok_or_else(|| CatalystError::Abi(format!("string length {len} out of range")))?;
    let domain = String::from_utf8(bytes.to_vec())
        .map_err(|e| CatalystError::Abi(format!("domain is not UTF-8: {e}")))?;

    Ok(CatalystRecord { id, owner, domain })
}
