use crate::config::AppConfig;
use crate::crypto::{calc_asset_hash, calc_message_hash, AssetHashFields, MessagePart};
use crate::errors::{AppError, AppResult};
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

use super::read_source;

fn print_hash(hash: &[u8; 32], bytes: usize) -> AppResult<()> {
    if !(1..=32).contains(&bytes) {
        return Err(AppError::InvalidInput(format!(
            "--bytes must be between 1 and 32, got {}",
            bytes
        )));
    }
    println!("{}", hex::encode(&hash[..bytes]));
    Ok(())
}

/// Compute the hash of an asset's contract fields
#[derive(Args)]
pub struct AssetHashCommand {
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub issuer: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub units: String,

    #[arg(long, default_value = "")]
    pub issue_date: String,

    #[arg(long, default_value = "")]
    pub expiry_date: String,

    /// Interest rate in percent per year
    #[arg(long)]
    pub interest_rate: Option<f64>,

    /// Display multiple for asset units
    #[arg(long)]
    pub multiple: Option<f64>,

    /// File holding the contract document
    #[arg(long)]
    pub contract: Option<PathBuf>,

    /// Leading bytes of the hash to print
    #[arg(long, default_value_t = 32)]
    pub bytes: usize,
}

impl AssetHashCommand {
    pub fn fields(&self) -> AppResult<AssetHashFields> {
        let contract_content = match &self.contract {
            Some(path) => std::fs::read(path)?,
            None => Vec::new(),
        };

        Ok(AssetHashFields {
            name: self.name.clone(),
            issuer: self.issuer.clone(),
            description: self.description.clone(),
            units: self.units.clone(),
            issue_date: self.issue_date.clone(),
            expiry_date: self.expiry_date.clone(),
            interest_rate: self.interest_rate,
            multiple: self.multiple,
            contract_content,
        })
    }

    pub fn run(&self, _config: &AppConfig) -> AppResult<()> {
        print_hash(&calc_asset_hash(&self.fields()?), self.bytes)
    }
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(with = "hex::serde")]
    salt: Vec<u8>,
    parts: Vec<MessagePart>,
}

/// Compute the hash of a message's salt and content parts
#[derive(Args)]
pub struct MessageHashCommand {
    /// JSON file with `salt` (hex) and `parts`, or - for stdin
    #[arg(long, default_value = "-")]
    pub json: String,

    /// Leading bytes of the hash to print
    #[arg(long, default_value_t = 32)]
    pub bytes: usize,
}

impl MessageHashCommand {
    pub fn run(&self, _config: &AppConfig) -> AppResult<()> {
        let content: MessageContent = serde_json::from_str(&read_source(&self.json)?)?;
        print_hash(&calc_message_hash(&content.salt, &content.parts), self.bytes)
    }
}
