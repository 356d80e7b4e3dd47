use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::types::common::{
    GENESIS_PREFIX, IO_INDEX_MAX, MESSAGE_PREFIX, PAYMENT_REF_PREFIX, TRANSFERS_PREFIX,
};
use crate::types::{GenesisRecord, IoRange, MessageRecord, PaymentRef, TransferList, TransferRecord};
use crate::codec::record_tags;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use super::parse_metadata_hex;

/// Decode every record in a metadata buffer or OP_RETURN script
#[derive(Args)]
pub struct DecodeCommand {
    /// Metadata or OP_RETURN script as hex
    pub hex: String,

    /// Number of inputs in the transaction (widest range if omitted)
    #[arg(long)]
    pub inputs: Option<usize>,

    /// Number of outputs in the transaction (widest range if omitted)
    #[arg(long)]
    pub outputs: Option<usize>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Records found in one metadata buffer
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct DecodedMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genesis: Option<GenesisRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfers: Option<TransferList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<PaymentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageRecord>,
    /// Tags this tool does not understand
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_tags: Vec<char>,
}

impl DecodedMetadata {
    pub fn is_empty(&self) -> bool {
        self.genesis.is_none()
            && self.transfers.is_none()
            && self.payment_ref.is_none()
            && self.message.is_none()
    }
}

/// Decode each tagged record in `metadata`
pub fn decode_metadata(
    metadata: &[u8],
    count_inputs: usize,
    count_outputs: usize,
) -> AppResult<DecodedMetadata> {
    let mut decoded = DecodedMetadata::default();

    for tag in record_tags(metadata)? {
        debug!("Decoding record tagged '{}'", tag as char);
        match tag {
            GENESIS_PREFIX => decoded.genesis = Some(GenesisRecord::decode(metadata)?),
            TRANSFERS_PREFIX => {
                decoded.transfers = Some(TransferList::decode(metadata, count_inputs, count_outputs)?)
            }
            PAYMENT_REF_PREFIX => decoded.payment_ref = Some(PaymentRef::decode(metadata)?),
            MESSAGE_PREFIX => decoded.message = Some(MessageRecord::decode(metadata, count_outputs)?),
            other => decoded.unknown_tags.push(other as char),
        }
    }

    Ok(decoded)
}

impl DecodeCommand {
    pub fn run(&self, _config: &AppConfig) -> AppResult<()> {
        let metadata = parse_metadata_hex(&self.hex)?;
        info!("Decoding {} bytes of metadata", metadata.len());

        let widest = IO_INDEX_MAX as usize;
        let decoded = decode_metadata(
            &metadata,
            self.inputs.unwrap_or(widest),
            self.outputs.unwrap_or(widest),
        )?;

        if decoded.is_empty() {
            return Err(AppError::InvalidInput(
                "metadata holds no recognised records".to_string(),
            ));
        }

        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&decoded)?),
            _ => print_decoded_text(&decoded),
        }

        Ok(())
    }
}

fn format_range(range: &IoRange) -> String {
    match range.count {
        0 => format!("none from {}", range.first),
        1 => format!("{}", range.first),
        count => format!("{} - {}", range.first, u64::from(range.first) + u64::from(count) - 1),
    }
}

fn print_genesis_text(genesis: &GenesisRecord) {
    println!("=== Genesis ===");
    println!("Quantity:      {} ({} x 10^{})", genesis.qty(), genesis.qty_mantissa, genesis.qty_exponent);
    println!("Flat charge:   {}", genesis.charge_flat());
    println!("Basis points:  {}", genesis.charge_basis_points);
    println!(
        "Location:      {}://{}/{}{}",
        if genesis.use_https { "https" } else { "http" },
        genesis.domain_name,
        if genesis.use_prefix { "coinspark/" } else { "" },
        genesis.page_path
    );
    println!("Asset hash:    {}", hex::encode(&genesis.asset_hash));
    println!();
}

fn print_transfer_text(index: usize, transfer: &TransferRecord) {
    if transfer.is_default_route() {
        println!("  #{} default route", index);
        println!("     Inputs:  {}", format_range(&transfer.inputs));
        println!("     Output:  {}", transfer.outputs.first);
        return;
    }

    println!("  #{} asset {}", index, transfer.asset_ref);
    println!("     Inputs:  {}", format_range(&transfer.inputs));
    println!("     Outputs: {}", format_range(&transfer.outputs));
    if transfer.qty_per_output == TransferRecord::TRANSFER_ALL {
        println!("     Qty:     all");
    } else {
        println!("     Qty:     {} per output", transfer.qty_per_output);
    }
}

fn print_message_text(message: &MessageRecord) {
    println!("=== Message ===");
    println!("Server URL:    {}", message.calc_server_url());
    println!("Public:        {}", if message.is_public { "yes" } else { "no" });
    for range in &message.output_ranges {
        println!("Outputs:       {}", format_range(range));
    }
    println!("Message hash:  {}", hex::encode(&message.hash));
    println!();
}

fn print_decoded_text(decoded: &DecodedMetadata) {
    if let Some(ref genesis) = decoded.genesis {
        print_genesis_text(genesis);
    }

    if let Some(ref transfers) = decoded.transfers {
        println!("=== Transfers ({}) ===", transfers.len());
        for (index, transfer) in transfers.iter().enumerate() {
            print_transfer_text(index, transfer);
        }
        println!();
    }

    if let Some(payment_ref) = decoded.payment_ref {
        println!("=== Payment Reference ===");
        println!("{}", payment_ref);
        println!();
    }

    if let Some(ref message) = decoded.message {
        print_message_text(message);
    }

    if !decoded.unknown_tags.is_empty() {
        let tags: Vec<String> = decoded.unknown_tags.iter().map(|t| format!("'{}'", t)).collect();
        println!("Unknown record tags: {}", tags.join(", "));
    }
}
