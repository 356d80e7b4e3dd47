//! Genesis record: creates an asset and fixes its supply and transfer charges
//!
//! The issued quantity and the flat charge are both stored as
//! `mantissa * 10^exponent`. The basis-points charge is applied on top of the
//! flat charge to every explicitly transferred output balance.

use serde::{Deserialize, Serialize};

use crate::codec::domain_path::DomainPath;
use crate::errors::{CodecError, CodecResult};
use crate::types::common::AssetQty;
use crate::utils::math::{mantissa_exponent_to_qty, qty_to_mantissa_exponent, Rounding};

pub const GENESIS_QTY_MANTISSA_MIN: u16 = 1;
pub const GENESIS_QTY_MANTISSA_MAX: u16 = 1000;
pub const GENESIS_QTY_EXPONENT_MAX: u8 = 11;
pub const GENESIS_CHARGE_FLAT_MANTISSA_MAX: u8 = 100;
pub const GENESIS_CHARGE_FLAT_MANTISSA_MAX_IF_EXP_MAX: u8 = 50;
pub const GENESIS_CHARGE_FLAT_EXPONENT_MAX: u8 = 2;
pub const GENESIS_CHARGE_BASIS_POINTS_MAX: u8 = 250;
pub const GENESIS_DOMAIN_NAME_MAX_LEN: usize = 32;
pub const GENESIS_PAGE_PATH_MAX_LEN: usize = 24;
pub const GENESIS_HASH_MIN_LEN: usize = 12;
pub const GENESIS_HASH_MAX_LEN: usize = 32;

/// Characters of the first spent txid used in place of an empty page path
const ASSET_URL_TXID_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRecord {
    pub qty_mantissa: u16,
    pub qty_exponent: u8,
    #[serde(default)]
    pub charge_flat_mantissa: u8,
    #[serde(default)]
    pub charge_flat_exponent: u8,
    #[serde(default)]
    pub charge_basis_points: u8,
    #[serde(default)]
    pub use_https: bool,
    pub domain_name: String,
    #[serde(default = "default_use_prefix")]
    pub use_prefix: bool,
    #[serde(default)]
    pub page_path: String,
    /// Leading bytes of the asset hash, 12 to 32 of them
    #[serde(with = "hex::serde")]
    pub asset_hash: Vec<u8>,
}

fn default_use_prefix() -> bool {
    true
}

impl Default for GenesisRecord {
    fn default() -> Self {
        Self {
            qty_mantissa: 0,
            qty_exponent: 0,
            charge_flat_mantissa: 0,
            charge_flat_exponent: 0,
            charge_basis_points: 0,
            use_https: false,
            domain_name: String::new(),
            use_prefix: true,
            page_path: String::new(),
            asset_hash: Vec::new(),
        }
    }
}

impl GenesisRecord {
    /// Check every field against its permitted range
    pub fn validate(&self) -> CodecResult<()> {
        if !(GENESIS_QTY_MANTISSA_MIN..=GENESIS_QTY_MANTISSA_MAX).contains(&self.qty_mantissa) {
            return Err(CodecError::validation(format!(
                "quantity mantissa {} outside {}..={}",
                self.qty_mantissa, GENESIS_QTY_MANTISSA_MIN, GENESIS_QTY_MANTISSA_MAX
            )));
        }

        if self.qty_exponent > GENESIS_QTY_EXPONENT_MAX {
            return Err(CodecError::validation(format!(
                "quantity exponent {} above {}",
                self.qty_exponent, GENESIS_QTY_EXPONENT_MAX
            )));
        }

        if self.charge_flat_exponent > GENESIS_CHARGE_FLAT_EXPONENT_MAX {
            return Err(CodecError::validation(format!(
                "flat charge exponent {} above {}",
                self.charge_flat_exponent, GENESIS_CHARGE_FLAT_EXPONENT_MAX
            )));
        }

        let flat_mantissa_max = if self.charge_flat_exponent == GENESIS_CHARGE_FLAT_EXPONENT_MAX {
            GENESIS_CHARGE_FLAT_MANTISSA_MAX_IF_EXP_MAX
        } else {
            GENESIS_CHARGE_FLAT_MANTISSA_MAX
        };
        if self.charge_flat_mantissa > flat_mantissa_max {
            return Err(CodecError::validation(format!(
                "flat charge mantissa {} above {} for exponent {}",
                self.charge_flat_mantissa, flat_mantissa_max, self.charge_flat_exponent
            )));
        }

        if self.charge_basis_points > GENESIS_CHARGE_BASIS_POINTS_MAX {
            return Err(CodecError::validation(format!(
                "basis points charge {} above {}",
                self.charge_basis_points, GENESIS_CHARGE_BASIS_POINTS_MAX
            )));
        }

        if self.domain_name.len() > GENESIS_DOMAIN_NAME_MAX_LEN {
            return Err(CodecError::validation(format!(
                "domain name longer than {} characters",
                GENESIS_DOMAIN_NAME_MAX_LEN
            )));
        }

        if self.page_path.len() > GENESIS_PAGE_PATH_MAX_LEN {
            return Err(CodecError::validation(format!(
                "page path longer than {} characters",
                GENESIS_PAGE_PATH_MAX_LEN
            )));
        }

        if !(GENESIS_HASH_MIN_LEN..=GENESIS_HASH_MAX_LEN).contains(&self.asset_hash.len()) {
            return Err(CodecError::validation(format!(
                "asset hash length {} outside {}..={}",
                self.asset_hash.len(),
                GENESIS_HASH_MIN_LEN,
                GENESIS_HASH_MAX_LEN
            )));
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Compare two records.
    ///
    /// Strict matching compares mantissas and exponents directly; loose
    /// matching compares the quantities they represent. Domain and path are
    /// compared case-insensitively and hashes only up to the shorter length.
    pub fn matches(&self, other: &GenesisRecord, strict: bool) -> bool {
        let hash_len = self
            .asset_hash
            .len()
            .min(other.asset_hash.len())
            .min(GENESIS_HASH_MAX_LEN);

        let quantities_match = if strict {
            self.qty_mantissa == other.qty_mantissa
                && self.qty_exponent == other.qty_exponent
                && self.charge_flat_mantissa == other.charge_flat_mantissa
                && self.charge_flat_exponent == other.charge_flat_exponent
        } else {
            self.qty() == other.qty() && self.charge_flat() == other.charge_flat()
        };

        quantities_match
            && self.charge_basis_points == other.charge_basis_points
            && self.use_https == other.use_https
            && self.domain_name.eq_ignore_ascii_case(&other.domain_name)
            && self.use_prefix == other.use_prefix
            && self.page_path.eq_ignore_ascii_case(&other.page_path)
            && self.asset_hash[..hash_len] == other.asset_hash[..hash_len]
    }

    /// Total issued quantity
    pub fn qty(&self) -> AssetQty {
        mantissa_exponent_to_qty(u64::from(self.qty_mantissa), u32::from(self.qty_exponent))
    }

    /// Set the issued quantity to the representable value closest to
    /// `desired_qty` under `rounding`, returning the value actually stored.
    pub fn set_qty(&mut self, desired_qty: AssetQty, rounding: Rounding) -> AssetQty {
        let packed = qty_to_mantissa_exponent(
            desired_qty,
            rounding,
            u64::from(GENESIS_QTY_MANTISSA_MAX),
            u32::from(GENESIS_QTY_EXPONENT_MAX),
        );
        self.qty_mantissa = packed.mantissa as u16;
        self.qty_exponent = packed.exponent as u8;
        self.qty()
    }

    pub fn charge_flat(&self) -> AssetQty {
        mantissa_exponent_to_qty(
            u64::from(self.charge_flat_mantissa),
            u32::from(self.charge_flat_exponent),
        )
    }

    pub fn set_charge_flat(&mut self, desired_charge: AssetQty, rounding: Rounding) -> AssetQty {
        let packed = qty_to_mantissa_exponent(
            desired_charge,
            rounding,
            u64::from(GENESIS_CHARGE_FLAT_MANTISSA_MAX),
            u32::from(GENESIS_CHARGE_FLAT_EXPONENT_MAX),
        );

        let mut mantissa = packed.mantissa as u8;
        if packed.exponent == u32::from(GENESIS_CHARGE_FLAT_EXPONENT_MAX) {
            mantissa = mantissa.min(GENESIS_CHARGE_FLAT_MANTISSA_MAX_IF_EXP_MAX);
        }

        self.charge_flat_mantissa = mantissa;
        self.charge_flat_exponent = packed.exponent as u8;
        self.charge_flat()
    }

    /// Charge deducted from a gross transfer, never more than the gross itself
    pub fn calc_charge(&self, qty_gross: AssetQty) -> AssetQty {
        let bps_charge = qty_gross
            .saturating_mul(u64::from(self.charge_basis_points))
            .saturating_add(5000)
            / 10_000;
        qty_gross.min(self.charge_flat().saturating_add(bps_charge))
    }

    pub fn calc_net(&self, qty_gross: AssetQty) -> AssetQty {
        qty_gross - self.calc_charge(qty_gross)
    }

    /// Smallest gross quantity whose net after charges is at least `qty_net`
    pub fn calc_gross(&self, qty_net: AssetQty) -> AssetQty {
        if qty_net == 0 {
            return 0;
        }

        let lower_gross = qty_net
            .saturating_add(self.charge_flat())
            .saturating_mul(10_000)
            / (10_000 - u64::from(self.charge_basis_points));

        if self.calc_net(lower_gross) >= qty_net {
            lower_gross
        } else {
            lower_gross + 1
        }
    }

    /// Web location carried in the encoded record
    pub fn domain_path(&self) -> DomainPath {
        DomainPath::new(
            &self.domain_name,
            &self.page_path,
            self.use_https,
            self.use_prefix,
        )
    }

    /// URL of the asset web page.
    ///
    /// Without a page path the URL ends in 16 hex characters of the first
    /// spent txid, starting at `first_spent_vout % 64` and wrapping around.
    pub fn calc_asset_url(&self, first_spent_txid: &str, first_spent_vout: u32) -> CodecResult<String> {
        let txid = first_spent_txid.as_bytes();
        if txid.len() != 64 || !txid.iter().all(u8::is_ascii_hexdigit) {
            return Err(CodecError::validation(format!(
                "first spent txid '{}' is not 64 hex characters",
                first_spent_txid
            )));
        }

        let page = if self.page_path.is_empty() {
            (0..ASSET_URL_TXID_CHARS)
                .map(|i| txid[(i + first_spent_vout as usize) % 64] as char)
                .collect()
        } else {
            self.page_path.clone()
        };

        let url = format!(
            "{}://{}/{}{}/",
            if self.use_https { "https" } else { "http" },
            self.domain_name,
            if self.use_prefix { "coinspark/" } else { "" },
            page
        );

        Ok(url.to_lowercase())
    }
}
