use crate::address::{CoinSparkAddress, ADDRESS_FLAG_ASSETS};
use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::types::PaymentRef;
use clap::{Args, Subcommand};

/// Convert between bitcoin and CoinSpark addresses
#[derive(Args)]
pub struct AddressCommand {
    #[command(subcommand)]
    pub action: AddressAction,
}

#[derive(Subcommand)]
pub enum AddressAction {
    /// Build a CoinSpark address from a bitcoin address
    Encode {
        /// Bitcoin address to wrap
        bitcoin_address: String,

        /// Address flags (1 assets, 2 payment refs, 4 text messages, 8 file messages)
        #[arg(long, default_value_t = ADDRESS_FLAG_ASSETS)]
        flags: u32,

        /// Payment reference to embed
        #[arg(long, default_value_t = 0, conflicts_with = "random_payment_ref")]
        payment_ref: u64,

        /// Embed a randomly chosen payment reference
        #[arg(long)]
        random_payment_ref: bool,
    },
    /// Read the bitcoin address and flags from a CoinSpark address
    Decode {
        /// CoinSpark address
        address: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl AddressCommand {
    pub fn run(&self, _config: &AppConfig) -> AppResult<()> {
        match &self.action {
            AddressAction::Encode {
                bitcoin_address,
                flags,
                payment_ref,
                random_payment_ref,
            } => {
                let payment_ref = if *random_payment_ref {
                    PaymentRef::random()
                } else {
                    PaymentRef::new(*payment_ref)?
                };
                let address = CoinSparkAddress::new(bitcoin_address, *flags, payment_ref);
                println!("{}", address.encode()?);
            }
            AddressAction::Decode { address, format } => {
                let decoded = CoinSparkAddress::decode(address)?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&decoded)?),
                    _ => println!("{}", decoded),
                }
            }
        }

        Ok(())
    }
}
