//! OP_RETURN framing for metadata buffers
//!
//! Metadata travels in a single data-carrying output whose script is
//! `OP_RETURN <push length> <metadata>`, using a direct push so the payload
//! is limited to 75 bytes.

use bitcoin::opcodes::all::OP_RETURN;
use bitcoin::{Script, ScriptBuf};
use tracing::debug;

use crate::errors::{CodecError, CodecResult};

/// Largest payload a direct push opcode can carry
pub const SCRIPT_DIRECT_PUSH_MAX: usize = 75;

/// Wrap a metadata buffer in an OP_RETURN script
pub fn metadata_to_script(metadata: &[u8]) -> CodecResult<ScriptBuf> {
    if metadata.is_empty() || metadata.len() > SCRIPT_DIRECT_PUSH_MAX {
        return Err(CodecError::Capacity {
            needed: metadata.len(),
            available: SCRIPT_DIRECT_PUSH_MAX,
        });
    }

    let mut bytes = Vec::with_capacity(metadata.len() + 2);
    bytes.push(OP_RETURN.to_u8());
    bytes.push(metadata.len() as u8);
    bytes.extend_from_slice(metadata);

    Ok(ScriptBuf::from_bytes(bytes))
}

/// Extract the metadata buffer from an OP_RETURN script
pub fn script_to_metadata(script: &Script) -> CodecResult<Vec<u8>> {
    let bytes = script.as_bytes();

    if bytes.len() <= 2 || bytes[0] != OP_RETURN.to_u8() {
        return Err(CodecError::malformed("not an OP_RETURN data script"));
    }

    let push_len = usize::from(bytes[1]);
    if push_len == 0 || push_len > SCRIPT_DIRECT_PUSH_MAX || push_len != bytes.len() - 2 {
        debug!(
            "Push length {} does not match script payload of {} bytes",
            push_len,
            bytes.len() - 2
        );
        return Err(CodecError::malformed(format!(
            "push length {} does not frame the script payload",
            push_len
        )));
    }

    Ok(bytes[2..].to_vec())
}

/// True for ordinary value-bearing outputs, false for OP_RETURN outputs
pub fn script_is_regular(script: &Script) -> bool {
    script
        .as_bytes()
        .first()
        .map_or(true, |&opcode| opcode != OP_RETURN.to_u8())
}

/// Metadata from the first data-carrying script among a transaction's outputs.
///
/// Returns `None` if there is no such script or it does not frame a
/// metadata buffer.
pub fn scripts_to_metadata(scripts: &[ScriptBuf]) -> Option<Vec<u8>> {
    scripts
        .iter()
        .find(|script| !script_is_regular(script))
        .and_then(|script| script_to_metadata(script).ok())
}

fn script_from_hex(script_hex: &str) -> CodecResult<ScriptBuf> {
    hex::decode(script_hex)
        .map(ScriptBuf::from_bytes)
        .map_err(|e| CodecError::malformed(format!("script hex: {}", e)))
}

pub fn metadata_to_script_hex(metadata: &[u8]) -> CodecResult<String> {
    metadata_to_script(metadata).map(|script| hex::encode(script.as_bytes()))
}

pub fn script_hex_to_metadata(script_hex: &str) -> CodecResult<Vec<u8>> {
    script_to_metadata(&script_from_hex(script_hex)?)
}

/// Regularity of a hex script; unparseable hex counts as regular
pub fn script_hex_is_regular(script_hex: &str) -> bool {
    script_from_hex(script_hex)
        .map(|script| script_is_regular(&script))
        .unwrap_or(true)
}
