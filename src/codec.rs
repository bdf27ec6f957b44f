//! Settings <-> share token.
//!
//! A token is the JSON form of [`Settings`] in URL-safe base64 without
//! padding, so it can sit after the `#` of a link. Standard base64 with
//! padding is accepted when decoding.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use thiserror::Error;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is not valid base64")]
    Base64(#[source] base64::DecodeError),
    #[error("token does not hold quiz settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token has no participants")]
    NoParticipants,
}

pub fn encode(settings: &Settings) -> String {
    // Settings only holds plain data; serializing it cannot fail
    let json = serde_json::to_string(settings).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(token: &str) -> Result<Settings, DecodeError> {
    let token = token.trim();
    let bytes = match URL_SAFE_NO_PAD.decode(token) {
        Ok(bytes) => bytes,
        Err(err) => STANDARD.decode(token).map_err(|_| DecodeError::Base64(err))?,
    };
    // btoa tokens carry one Latin-1 byte per character
    let json = String::from_utf8(bytes)
        .unwrap_or_else(|err| err.into_bytes().iter().map(|&b| b as char).collect());
    let settings: Settings = serde_json::from_str(&json)?;
    if !settings.has_names() {
        return Err(DecodeError::NoParticipants);
    }
    Ok(settings)
}

/// `#<token>` for the given settings.
pub fn fragment(settings: &Settings) -> String {
    format!("#{}", encode(settings))
}

/// Token part of a fragment.
///
/// Takes `#token`, a full link ending in `#token`, or a bare token.
/// Blank input and a bare `#` mean "no fragment".
pub fn token_from_fragment(input: &str) -> Option<&str> {
    let token = match input.split_once('#') {
        Some((_, after)) => after,
        None => input,
    };
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
