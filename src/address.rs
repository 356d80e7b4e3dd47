//! CoinSpark address text format
//!
//! A CoinSpark address wraps a bitcoin address together with capability
//! flags and an optional payment reference. The text starts with `s`, the
//! extra data is stored in base 58 ahead of the shifted bitcoin address, and
//! the first half of the string is mixed with the second half so addresses
//! sharing a bitcoin prefix do not look alike.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{CodecError, CodecResult};
use crate::types::payment_ref::PaymentRef;

pub const ADDRESS_FLAG_ASSETS: u32 = 1;
pub const ADDRESS_FLAG_PAYMENT_REFS: u32 = 2;
pub const ADDRESS_FLAG_TEXT_MESSAGES: u32 = 4;
pub const ADDRESS_FLAG_FILE_MESSAGES: u32 = 8;
/// Bits currently usable for flags
pub const ADDRESS_FLAG_MASK: u32 = 0x7F_FFFF;

const ADDRESS_PREFIX: char = 's';
const ADDRESS_FLAG_CHARS_MULTIPLE: u8 = 10;
const ADDRESS_CHAR_INCREMENT: u8 = 13;
/// Longest bitcoin address the format carries
const BITCOIN_ADDRESS_MAX_LEN: usize = 63;

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn base58_value(c: u8) -> Option<u8> {
    BASE58_ALPHABET
        .iter()
        .position(|&a| a == c)
        .map(|index| index as u8)
}

/// Little-endian base-58 digits of `value`, none for zero
fn base58_digits(mut value: u64) -> Vec<u8> {
    let mut digits = Vec::new();
    while value > 0 {
        digits.push((value % 58) as u8);
        value /= 58;
    }
    digits
}

fn base58_value_of(digits: &[u8]) -> u64 {
    digits
        .iter()
        .rev()
        .fold(0u64, |acc, &d| acc.saturating_mul(58).saturating_add(u64::from(d)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSparkAddress {
    pub bitcoin_address: String,
    #[serde(default)]
    pub address_flags: u32,
    #[serde(default)]
    pub payment_ref: PaymentRef,
}

impl CoinSparkAddress {
    pub fn new(bitcoin_address: &str, address_flags: u32, payment_ref: PaymentRef) -> Self {
        Self {
            bitcoin_address: bitcoin_address.to_string(),
            address_flags,
            payment_ref,
        }
    }

    pub fn validate(&self) -> CodecResult<()> {
        if self.bitcoin_address.is_empty() {
            return Err(CodecError::validation("empty bitcoin address"));
        }

        if self.bitcoin_address.len() > BITCOIN_ADDRESS_MAX_LEN {
            return Err(CodecError::validation(format!(
                "bitcoin address longer than {} characters",
                BITCOIN_ADDRESS_MAX_LEN
            )));
        }

        if self.address_flags & ADDRESS_FLAG_MASK != self.address_flags {
            return Err(CodecError::validation(format!(
                "address flags {:#x} outside mask {:#x}",
                self.address_flags, ADDRESS_FLAG_MASK
            )));
        }

        self.payment_ref.validate()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.address_flags & flag != 0
    }

    pub fn encode(&self) -> CodecResult<String> {
        self.validate()?;

        let flag_digits = base58_digits(u64::from(self.address_flags));
        let ref_digits = base58_digits(self.payment_ref.value());
        let extra: Vec<u8> = flag_digits.iter().chain(&ref_digits).copied().collect();

        // position 0 stands for the prefix and is never mixed
        let mut digits = Vec::with_capacity(2 + extra.len() + self.bitcoin_address.len());
        digits.push(0);
        digits.push(flag_digits.len() as u8 * ADDRESS_FLAG_CHARS_MULTIPLE + ref_digits.len() as u8);
        digits.extend_from_slice(&extra);

        for (index, c) in self.bitcoin_address.bytes().enumerate() {
            let value = base58_value(c).ok_or_else(|| {
                CodecError::validation(format!(
                    "'{}' is not a base-58 character",
                    char::from(c)
                ))
            })?;

            let mut shifted = u32::from(value) + u32::from(ADDRESS_CHAR_INCREMENT);
            if !extra.is_empty() {
                shifted += u32::from(extra[index % extra.len()]);
            }
            digits.push((shifted % 58) as u8);
        }

        let len = digits.len();
        for index in 1..(len + 1) / 2 {
            digits[index] = (digits[index] + digits[len - index]) % 58;
        }

        let mut encoded = String::with_capacity(len);
        encoded.push(ADDRESS_PREFIX);
        encoded.extend(
            digits[1..]
                .iter()
                .map(|&d| char::from(BASE58_ALPHABET[usize::from(d)])),
        );
        Ok(encoded)
    }

    pub fn decode(text: &str) -> CodecResult<Self> {
        let bytes = text.as_bytes();
        if bytes.len() < 2 || bytes[0] != ADDRESS_PREFIX as u8 {
            return Err(CodecError::malformed(format!(
                "'{}' is not a CoinSpark address",
                text
            )));
        }

        let mut digits = Vec::with_capacity(bytes.len());
        digits.push(0u8);
        for &c in &bytes[1..] {
            let value = base58_value(c).ok_or_else(|| {
                CodecError::malformed(format!("'{}' is not a base-58 character", char::from(c)))
            })?;
            digits.push(value);
        }

        let len = digits.len();
        for index in 1..(len + 1) / 2 {
            digits[index] = (digits[index] + 58 - digits[len - index]) % 58;
        }

        let flag_chars = usize::from(digits[1] / ADDRESS_FLAG_CHARS_MULTIPLE);
        let ref_chars = usize::from(digits[1] % ADDRESS_FLAG_CHARS_MULTIPLE);
        let extra_chars = flag_chars + ref_chars;

        if len < 2 + extra_chars {
            return Err(CodecError::Truncated {
                expected: 2 + extra_chars,
                actual: len,
            });
        }

        let extra = &digits[2..2 + extra_chars];
        let address_flags = u32::try_from(base58_value_of(&extra[..flag_chars]))
            .map_err(|_| CodecError::malformed("address flags overflow"))?;
        let payment_ref = PaymentRef(base58_value_of(&extra[flag_chars..]));

        let bitcoin_address: String = digits[2 + extra_chars..]
            .iter()
            .enumerate()
            .map(|(index, &d)| {
                let mut value = u32::from(d) + 58 * 2 - u32::from(ADDRESS_CHAR_INCREMENT);
                if extra_chars > 0 {
                    value -= u32::from(extra[index % extra_chars]);
                }
                char::from(BASE58_ALPHABET[(value % 58) as usize])
            })
            .collect();

        let address = Self {
            bitcoin_address,
            address_flags,
            payment_ref,
        };
        address.validate()?;
        Ok(address)
    }
}

impl fmt::Display for CoinSparkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (ADDRESS_FLAG_ASSETS, "assets"),
            (ADDRESS_FLAG_PAYMENT_REFS, "payment references"),
            (ADDRESS_FLAG_TEXT_MESSAGES, "text messages"),
            (ADDRESS_FLAG_FILE_MESSAGES, "file messages"),
        ]
        .iter()
        .filter(|(flag, _)| self.has_flag(*flag))
        .map(|(_, name)| *name)
        .collect();

        writeln!(f, "  Bitcoin address: {}", self.bitcoin_address)?;
        if names.is_empty() {
            writeln!(f, "    Address flags: {}", self.address_flags)?;
        } else {
            writeln!(
                f,
                "    Address flags: {} [{}]",
                self.address_flags,
                names.join(", ")
            )?;
        }
        write!(f, "Payment reference: {}", self.payment_ref)
    }
}

impl FromStr for CoinSparkAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
