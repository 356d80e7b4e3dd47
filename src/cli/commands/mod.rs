pub mod address;
pub mod decode;
pub mod encode;
pub mod hash;
pub mod show_config;

use std::io::Read;

use crate::errors::AppResult;
use crate::script::{script_hex_is_regular, script_hex_to_metadata};

/// Read a file, or stdin when the source is `-`
pub(crate) fn read_source(source: &str) -> AppResult<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

/// Metadata from hex that is either a bare buffer or an OP_RETURN script
pub fn parse_metadata_hex(text: &str) -> AppResult<Vec<u8>> {
    let text = text.trim();
    if script_hex_is_regular(text) {
        Ok(hex::decode(text)?)
    } else {
        Ok(script_hex_to_metadata(text)?)
    }
}
