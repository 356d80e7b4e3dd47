use crate::codec::{append, max_append_len};
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::script::metadata_to_script_hex;
use crate::types::{CodecLimits, GenesisRecord, MessageRecord, PaymentRef, TransferList};
use clap::{Args, ValueEnum};
use tracing::info;

use super::{parse_metadata_hex, read_source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Genesis,
    Transfers,
    PaymentRef,
    Message,
}

/// Encode a JSON record as metadata
#[derive(Args)]
pub struct EncodeCommand {
    /// Kind of record to encode
    #[arg(value_enum)]
    pub kind: RecordKind,

    /// JSON file holding the record, or - for stdin
    #[arg(long, default_value = "-")]
    pub json: String,

    /// Maximum metadata length (overrides coinspark.toml)
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Number of inputs in the transaction (transfers only)
    #[arg(long)]
    pub inputs: Option<usize>,

    /// Number of outputs in the transaction (transfers and messages)
    #[arg(long)]
    pub outputs: Option<usize>,

    /// Existing metadata (hex) to append the new record to
    #[arg(long)]
    pub append: Option<String>,

    /// Wrap the result in an OP_RETURN script
    #[arg(long)]
    pub script: bool,
}

impl EncodeCommand {
    fn require(&self, value: Option<usize>, flag: &str) -> AppResult<usize> {
        value.ok_or_else(|| {
            AppError::InvalidInput(format!("--{} is required for this record kind", flag))
        })
    }

    /// Encode the record in `json` within `metadata_max_len` bytes
    pub fn encode_record(&self, json: &str, config: &AppConfig) -> AppResult<Vec<u8>> {
        let mut limits = config.limits();
        if let Some(max_len) = self.max_len {
            limits.metadata_max_len = max_len;
        }

        let existing = match &self.append {
            Some(hex) => Some(parse_metadata_hex(hex)?),
            None => None,
        };

        let record_max_len = match &existing {
            Some(metadata) => max_append_len(metadata, limits.metadata_max_len),
            None => limits.metadata_max_len,
        };

        let encoded = match self.kind {
            RecordKind::Genesis => {
                let genesis: GenesisRecord = serde_json::from_str(json)?;
                genesis.encode(record_max_len)?
            }
            RecordKind::Transfers => {
                let transfers: TransferList = serde_json::from_str(json)?;
                let record_limits = CodecLimits {
                    metadata_max_len: record_max_len,
                    ..limits
                };
                transfers.encode(
                    self.require(self.inputs, "inputs")?,
                    self.require(self.outputs, "outputs")?,
                    &record_limits,
                )?
            }
            RecordKind::PaymentRef => {
                let payment_ref: PaymentRef = serde_json::from_str(json)?;
                payment_ref.encode(record_max_len)?
            }
            RecordKind::Message => {
                let message: MessageRecord = serde_json::from_str(json)?;
                message.encode(self.require(self.outputs, "outputs")?, record_max_len)?
            }
        };

        match existing {
            Some(metadata) => Ok(append(&metadata, limits.metadata_max_len, &encoded)?),
            None => Ok(encoded),
        }
    }

    pub fn run(&self, config: &AppConfig) -> AppResult<()> {
        let json = read_source(&self.json)?;
        let metadata = self.encode_record(&json, config)?;
        info!("Encoded {:?} record into {} bytes", self.kind, metadata.len());

        if self.script {
            println!("{}", metadata_to_script_hex(&metadata)?);
        } else {
            println!("{}", hex::encode(&metadata));
        }

        Ok(())
    }
}
