//! Field checks shared by the actuators. Pure functions over raw payload
//! bytes; each returns `false` rather than an error so callers pick the
//! error variant and message.

use trellis_common::chain_constants::{
    MAX_ASSET_DESCRIPTION_LEN, MAX_ASSET_NAME_LEN, MAX_URL_LEN, NATIVE_TOKEN_NAME,
};

/// Non-empty, at most `MAX_URL_LEN` bytes, UTF-8, no control characters.
pub fn valid_url(url: &[u8]) -> bool {
    if url.is_empty() || url.len() > MAX_URL_LEN {
        return false;
    }
    match std::str::from_utf8(url) {
        Ok(s) => !s.chars().any(char::is_control),
        Err(_) => false,
    }
}

/// Non-empty, at most `MAX_ASSET_NAME_LEN` bytes of visible ASCII, and not
/// the native token's name in any letter case.
pub fn valid_asset_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_ASSET_NAME_LEN
        && name.bytes().all(|b| b.is_ascii_graphic())
        && !name.eq_ignore_ascii_case(NATIVE_TOKEN_NAME)
}

/// Empty is allowed.
pub fn valid_description(description: &str) -> bool {
    description.len() <= MAX_ASSET_DESCRIPTION_LEN
}
