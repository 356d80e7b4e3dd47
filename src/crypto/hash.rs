//! SHA-256 asset and message hashes
//!
//! Text fields are trimmed of tabs, line breaks and spaces at both ends and
//! each field is terminated by a NUL byte before hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Scale applied to interest rate and multiple before hashing
const FIXED_POINT_SCALE: f64 = 1_000_000.0;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Asset contract fields covered by the asset hash
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetHashFields {
    pub name: String,
    pub issuer: String,
    pub description: String,
    pub units: String,
    pub issue_date: String,
    pub expiry_date: String,
    /// Defaults to 0 when absent
    pub interest_rate: Option<f64>,
    /// Defaults to 1 when absent
    pub multiple: Option<f64>,
    #[serde(with = "hex::serde")]
    pub contract_content: Vec<u8>,
}

/// One part of a message's content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    pub mime_type: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(with = "hex::serde")]
    pub content: Vec<u8>,
}

fn trim_field(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '\t' | '\n' | '\r' | ' '))
}

fn push_field(buffer: &mut Vec<u8>, field: &[u8]) {
    buffer.extend_from_slice(field);
    buffer.push(0);
}

fn fixed_point(value: f64) -> i64 {
    (value * FIXED_POINT_SCALE + 0.5) as i64
}

pub fn calc_asset_hash(fields: &AssetHashFields) -> [u8; 32] {
    let mut buffer = Vec::with_capacity(256 + fields.contract_content.len());

    for text in [
        &fields.name,
        &fields.issuer,
        &fields.description,
        &fields.units,
        &fields.issue_date,
        &fields.expiry_date,
    ] {
        push_field(&mut buffer, trim_field(text).as_bytes());
    }

    let interest_rate = fixed_point(fields.interest_rate.unwrap_or(0.0));
    let multiple = fixed_point(fields.multiple.unwrap_or(1.0));
    push_field(&mut buffer, interest_rate.to_string().as_bytes());
    push_field(&mut buffer, multiple.to_string().as_bytes());

    push_field(&mut buffer, &fields.contract_content);

    sha256(&buffer)
}

/// Hash of a message's content, salted so the server can prove knowledge
pub fn calc_message_hash(salt: &[u8], parts: &[MessagePart]) -> [u8; 32] {
    let mut buffer = Vec::with_capacity(
        salt.len() + 1 + parts.iter().map(|p| p.content.len() + 64).sum::<usize>(),
    );

    push_field(&mut buffer, salt);
    for part in parts {
        push_field(&mut buffer, part.mime_type.as_bytes());
        push_field(&mut buffer, part.file_name.as_bytes());
        push_field(&mut buffer, &part.content);
    }

    sha256(&buffer)
}
