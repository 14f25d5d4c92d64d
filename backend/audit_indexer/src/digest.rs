//! Client-side digests submitted alongside registry calls.
//!
//! The registry stores `code_hash` and `finding_hash` verbatim and never
//! recomputes them, so dashboards and auditors must agree on how they are
//! derived. Both are Keccak-256, hex-encoded with a `0x` prefix, over the same
//! bytes the web dashboard hashes.

use sha3::{Digest, Keccak256};

use crate::errors::{IndexerError, Result};

fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Bytes of a text input as the dashboard encodes them: `0x`-prefixed hex is
/// decoded (odd lengths are left-padded with a zero nibble), anything else is
/// taken as UTF-8.
fn input_bytes(input: &str) -> Vec<u8> {
    if let Some(digits) = input.strip_prefix("0x") {
        if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            let padded = if digits.len() % 2 == 1 {
                format!("0{digits}")
            } else {
                digits.to_string()
            };
            if let Ok(bytes) = hex::decode(padded) {
                return bytes;
            }
        }
    }
    input.as_bytes().to_vec()
}

/// Digest committing to submitted code.
///
/// When `bytecode` is given its bytes are hashed; otherwise the contract URI
/// is, as its raw UTF-8 bytes. The URI is required either way.
pub fn code_hash(contract_uri: &str, bytecode: Option<&str>) -> Result<String> {
    if contract_uri.is_empty() {
        return Err(IndexerError::InvalidRequest(
            "contract_uri must not be empty".to_string(),
        ));
    }

    let digest = match bytecode.map(str::trim).filter(|b| !b.is_empty()) {
        Some(code) => Keccak256::digest(input_bytes(code)),
        None => Keccak256::digest(contract_uri.as_bytes()),
    };
    Ok(to_hex(&digest))
}

/// Digest binding a finding's plaintext title and description, hashed as one
/// concatenated string.
pub fn finding_hash(title: &str, description: &str) -> String {
    let joined = format!("{title}{description}");
    to_hex(&Keccak256::digest(input_bytes(&joined)))
}
