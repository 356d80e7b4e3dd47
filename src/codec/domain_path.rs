//! Domain name and page path compression
//!
//! A domain name and page path pair is packed into a single packing byte plus
//! a run of base-40 "triplets":
//!
//! ```text
//! packing byte:  [prefix:2 bits][suffix:6 bits]
//!                suffix 63 marks an IPv4 address, bit 0x40 then flags HTTPS
//! general case:  packing, triplets("<shrunk-domain><end><path><end>")
//! IPv4 case:     packing, 4 octets, triplets("<path><end>")
//! ```
//!
//! Each end character is `>` for true or `<` for false and carries the
//! `use_https` (after the domain) and `use_prefix` (after the path) flags.
//! Three alphabet symbols are combined into one value `c0 + c1*40 + c2*1600`
//! written as 2 small-endian bytes; a trailing partial group still takes 2 bytes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CodecError, CodecResult};
use crate::utils::bytes::{write_small_endian, MetadataReader};

pub const DOMAIN_PACKING_PREFIX_MASK: u8 = 0xC0;
pub const DOMAIN_PACKING_PREFIX_SHIFT: u8 = 6;
pub const DOMAIN_PACKING_SUFFIX_MASK: u8 = 0x3F;
pub const DOMAIN_PACKING_SUFFIX_IPV4: u8 = 63;
pub const DOMAIN_PACKING_IPV4_HTTPS: u8 = 0x40;

const ENCODE_BASE: u32 = 40;
const TRIPLET_LIMIT: u64 = (ENCODE_BASE * ENCODE_BASE * ENCODE_BASE) as u64;
const FALSE_END_CHAR: char = '<';
const TRUE_END_CHAR: char = '>';
const DOMAIN_NAME_CHARS: &[u8; 40] = b"0123456789abcdefghijklmnopqrstuvwxyz-.<>";

/// Longest domain name the compressor will accept
const DOMAIN_NAME_MAX_LEN: usize = 255;

pub const DOMAIN_NAME_PREFIXES: [&str; 2] = ["", "www."];

pub const DOMAIN_NAME_SUFFIXES: [&str; 60] = [
    "", ".at", ".au", ".be", ".biz", ".br", ".ca", ".ch", ".cn", ".co.jp", ".co.kr", ".co.uk",
    ".co.za", ".co", ".com.ar", ".com.au", ".com.br", ".com.cn", ".com.mx", ".com.tr", ".com.tw",
    ".com.ua", ".com", ".cz", ".de", ".dk", ".edu", ".es", ".eu", ".fr", ".gov", ".gr", ".hk",
    ".hu", ".il", ".in", ".info", ".ir", ".it", ".jp", ".kr", ".me", ".mx", ".net", ".nl", ".no",
    ".org", ".pl", ".ps", ".ro", ".ru", ".se", ".sg", ".tr", ".tv", ".tw", ".ua", ".uk", ".us",
    ".vn",
];

/// Domain name with its dictionary prefix and suffix removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrunkDomain {
    pub domain_name: String,
    pub packing: u8,
}

/// Lower-case `domain_name` and strip the longest known prefix and suffix.
///
/// Ties keep the first dictionary entry found; only a strictly longer match
/// replaces it.
pub fn shrink_lower_domain_name(domain_name: &str) -> CodecResult<ShrunkDomain> {
    if domain_name.is_empty() || domain_name.len() > DOMAIN_NAME_MAX_LEN {
        return Err(CodecError::validation(format!(
            "domain name length {} outside 1..={}",
            domain_name.len(),
            DOMAIN_NAME_MAX_LEN
        )));
    }

    let lowered = domain_name.to_lowercase();

    let mut best_prefix = (0usize, 0usize);
    for (index, prefix) in DOMAIN_NAME_PREFIXES.iter().enumerate() {
        if prefix.len() > best_prefix.1 && lowered.starts_with(prefix) {
            best_prefix = (index, prefix.len());
        }
    }
    let remainder = &lowered[best_prefix.1..];

    let mut best_suffix = (0usize, 0usize);
    for (index, suffix) in DOMAIN_NAME_SUFFIXES.iter().enumerate() {
        if suffix.len() > best_suffix.1 && remainder.ends_with(suffix) {
            best_suffix = (index, suffix.len());
        }
    }
    let shrunk = &remainder[..remainder.len() - best_suffix.1];
    if shrunk.is_empty() {
        return Err(CodecError::validation(format!(
            "domain name '{}' is only a dictionary prefix and suffix",
            domain_name
        )));
    }

    let packing = (((best_prefix.0 as u8) << DOMAIN_PACKING_PREFIX_SHIFT)
        & DOMAIN_PACKING_PREFIX_MASK)
        | ((best_suffix.0 as u8) & DOMAIN_PACKING_SUFFIX_MASK);

    Ok(ShrunkDomain {
        domain_name: shrunk.to_string(),
        packing,
    })
}

/// Inverse of [`shrink_lower_domain_name`]
pub fn expand_domain_name(short_domain: &str, packing: u8) -> CodecResult<String> {
    let prefix_index =
        ((packing & DOMAIN_PACKING_PREFIX_MASK) >> DOMAIN_PACKING_PREFIX_SHIFT) as usize;
    let prefix = DOMAIN_NAME_PREFIXES.get(prefix_index).ok_or_else(|| {
        CodecError::malformed(format!("domain prefix index {} out of range", prefix_index))
    })?;

    let suffix_index = (packing & DOMAIN_PACKING_SUFFIX_MASK) as usize;
    let suffix = DOMAIN_NAME_SUFFIXES.get(suffix_index).ok_or_else(|| {
        CodecError::malformed(format!("domain suffix index {} out of range", suffix_index))
    })?;

    Ok(format!("{}{}{}", prefix, short_domain, suffix))
}

/// Parse a strict dotted-quad IPv4 address.
///
/// Only digits and dots are allowed, there must be exactly four non-empty
/// octets and each must be at most 255.
pub fn read_ipv4_address(domain_name: &str) -> Option<[u8; 4]> {
    if !domain_name.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let parts: Vec<&str> = domain_name.split('.').collect();
    if parts.len() != 4 {
        return None;
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() {
            return None;
        }
        *octet = part.parse::<u8>().ok()?;
    }

    Some(octets)
}

fn end_char(flag: bool) -> char {
    if flag {
        TRUE_END_CHAR
    } else {
        FALSE_END_CHAR
    }
}

/// Alphabet index of `c`, matched case-insensitively
fn char_value(c: char) -> Option<u32> {
    let lowered = c.to_ascii_lowercase();
    DOMAIN_NAME_CHARS
        .iter()
        .position(|&b| b as char == lowered)
        .map(|p| p as u32)
}

fn encode_triplets(string: &str, out: &mut Vec<u8>) -> CodecResult<()> {
    let chars: Vec<char> = string.chars().collect();
    let mut triplet = 0u32;

    for (pos, &c) in chars.iter().enumerate() {
        let value = char_value(c).ok_or_else(|| {
            CodecError::validation(format!("character '{}' cannot be encoded", c))
        })?;

        triplet = match pos % 3 {
            0 => value,
            1 => triplet + value * ENCODE_BASE,
            _ => triplet + value * ENCODE_BASE * ENCODE_BASE,
        };

        if pos % 3 == 2 || pos == chars.len() - 1 {
            write_small_endian(out, u64::from(triplet), 2)?;
        }
    }

    Ok(())
}

/// Decode triplets until `parts` end characters have been read
fn decode_triplets(reader: &mut MetadataReader<'_>, mut parts: usize) -> CodecResult<String> {
    let mut string = String::new();
    let mut triplet = 0u64;
    let mut pos = 0usize;

    while parts > 0 {
        if pos % 3 == 0 {
            triplet = reader.read_uint(2)?;
            if triplet >= TRIPLET_LIMIT {
                debug!("Invalid domain/path triplet value {}", triplet);
                return Err(CodecError::malformed(format!(
                    "triplet value {} out of range",
                    triplet
                )));
            }
        }

        let base = u64::from(ENCODE_BASE);
        let value = match pos % 3 {
            0 => triplet % base,
            1 => (triplet / base) % base,
            _ => triplet / (base * base),
        };

        let c = DOMAIN_NAME_CHARS[value as usize] as char;
        string.push(c);
        pos += 1;

        if c == TRUE_END_CHAR || c == FALSE_END_CHAR {
            parts -= 1;
        }
    }

    Ok(string)
}

/// Split off the text before the first end character and the flag it carries
fn take_part(decoded: &str) -> CodecResult<(&str, bool, &str)> {
    let end = decoded
        .find([TRUE_END_CHAR, FALSE_END_CHAR])
        .ok_or_else(|| CodecError::malformed("missing end character"))?;
    let flag = decoded[end..].starts_with(TRUE_END_CHAR);
    Ok((&decoded[..end], flag, &decoded[end + 1..]))
}

/// Web location shared by genesis and message records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainPath {
    pub domain_name: String,
    pub use_https: bool,
    pub page_path: String,
    pub use_prefix: bool,
}

impl DomainPath {
    pub fn new(domain_name: &str, page_path: &str, use_https: bool, use_prefix: bool) -> Self {
        Self {
            domain_name: domain_name.to_string(),
            use_https,
            page_path: page_path.to_string(),
            use_prefix,
        }
    }

    /// Encode as packing byte plus triplets (or packing byte, octets and triplets)
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        for text in [&self.domain_name, &self.page_path] {
            if text.contains([TRUE_END_CHAR, FALSE_END_CHAR]) {
                return Err(CodecError::validation(format!(
                    "'{}' contains a reserved end character",
                    text
                )));
            }
        }

        let mut out = Vec::new();
        let mut encode_string = String::new();

        if let Some(octets) = read_ipv4_address(&self.domain_name) {
            let https = if self.use_https {
                DOMAIN_PACKING_IPV4_HTTPS
            } else {
                0
            };
            out.push(DOMAIN_PACKING_SUFFIX_IPV4 | https);
            out.extend_from_slice(&octets);
        } else {
            let shrunk = shrink_lower_domain_name(&self.domain_name)?;
            out.push(shrunk.packing);
            encode_string.push_str(&shrunk.domain_name);
            encode_string.push(end_char(self.use_https));
        }

        encode_string.push_str(&self.page_path);
        encode_string.push(end_char(self.use_prefix));

        encode_triplets(&encode_string, &mut out)?;
        Ok(out)
    }

    /// Number of bytes [`DomainPath::encode`] produces
    pub fn encoded_len(&self) -> CodecResult<usize> {
        self.encode().map(|bytes| bytes.len())
    }

    /// Decode from the reader's current position
    pub fn decode(reader: &mut MetadataReader<'_>) -> CodecResult<Self> {
        let packing = reader.read_u8()?;
        let is_ipv4 = (packing & DOMAIN_PACKING_SUFFIX_MASK) == DOMAIN_PACKING_SUFFIX_IPV4;

        if is_ipv4 {
            let octets = reader.read_bytes(4)?;
            let domain_name = format!(
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            );
            let decoded = decode_triplets(reader, 1)?;
            let (page_path, use_prefix, _) = take_part(&decoded)?;

            return Ok(Self {
                domain_name,
                use_https: packing & DOMAIN_PACKING_IPV4_HTTPS != 0,
                page_path: page_path.to_string(),
                use_prefix,
            });
        }

        let decoded = decode_triplets(reader, 2)?;
        let (short_domain, use_https, rest) = take_part(&decoded)?;
        let (page_path, use_prefix, _) = take_part(rest)?;

        Ok(Self {
            domain_name: expand_domain_name(short_domain, packing)?,
            use_https,
            page_path: page_path.to_string(),
            use_prefix,
        })
    }
}
