//! Persisted record encoding.
//!
//! A stored record is `base64(json(UserContext))`. [`encode`] and [`decode`]
//! are exact inverses for any record produced by [`encode`].

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::context::UserContext;
use crate::error::{ContextError, ContextResult};

/// Standard alphabet. Encoding pads; decoding accepts padded and unpadded
/// input alike.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a context into its stored text form.
pub fn encode(context: &UserContext) -> ContextResult<String> {
    let json = serde_json::to_string(context).map_err(ContextError::payload)?;
    Ok(BASE64.encode(json))
}

/// Decode stored text back into a context.
///
/// ASCII whitespace anywhere in `text` (e.g. line wrapping or a trailing
/// newline from the cache) is ignored, as is missing `=` padding.
pub fn decode(text: &str) -> ContextResult<UserContext> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| ContextError::payload(format!("invalid base64: {}", e)))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| ContextError::payload(format!("invalid utf-8: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| ContextError::payload(format!("invalid json: {}", e)))
}
