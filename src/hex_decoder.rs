//! Hex text decoding.

use crate::error::{EwkbError, EwkbResult};

/// Decodes ASCII hex text (either case) into bytes.
///
/// # Errors
///
/// Returns `EwkbError::InvalidInput` if the text has odd length or contains a
/// character outside `[0-9a-fA-F]`.
pub fn decode_hex(text: &str) -> EwkbResult<Vec<u8>> {
    ::hex::decode(text).map_err(|e| match e {
        ::hex::FromHexError::InvalidHexCharacter { c, index } => EwkbError::InvalidInput {
            offset: index,
            reason: format!("{:?} is not a hex digit", c),
        },
        ::hex::FromHexError::OddLength => EwkbError::InvalidInput {
            offset: text.len(),
            reason: format!("odd number of hex digits ({})", text.len()),
        },
        ::hex::FromHexError::InvalidStringLength => EwkbError::InvalidInput {
            offset: text.len(),
            reason: "invalid hex string length".to_string(),
        },
    })
}
