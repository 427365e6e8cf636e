//! One-shot flash messages carried in a signed cookie
//!
//! Cookie value: `<level>.<hex message>.<hex HMAC-SHA256>`, where the MAC
//! covers `<level>.<hex message>` and is keyed with the process secret.
//! A cookie that fails verification is ignored.

use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "flash";

/// Longest message carried, in bytes. Hex doubles it, which keeps the cookie
/// well under the 4096-byte limit browsers enforce.
pub const MAX_MESSAGE_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    fn new(level: FlashLevel, message: String) -> Self {
        Self {
            level,
            message: truncate(message, MAX_MESSAGE_BYTES),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, message.into())
    }
}

/// Cut `message` to at most `max` bytes on a char boundary, marking the cut with an ellipsis
fn truncate(mut message: String, max: usize) -> String {
    if message.len() <= max {
        return message;
    }
    let ellipsis = '\u{2026}';
    let mut end = max - ellipsis.len_utf8();
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message.truncate(end);
    message.push(ellipsis);
    message
}

fn keyed_mac(secret: &[u8], payload: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| warn!("Flash secret rejected: {}", e))
        .ok()?;
    mac.update(payload.as_bytes());
    Some(mac)
}

/// Encode and sign a flash message as a cookie value
pub fn encode(secret: &[u8], flash: &FlashMessage) -> Option<String> {
    let payload = format!("{}.{}", flash.level.as_str(), hex::encode(&flash.message));
    let sig = keyed_mac(secret, &payload)?.finalize().into_bytes();
    Some(format!("{payload}.{}", hex::encode(sig)))
}

/// Verify and decode a cookie value
pub fn decode(secret: &[u8], value: &str) -> Option<FlashMessage> {
    let (payload, mac_hex) = value.rsplit_once('.')?;
    let expected = hex::decode(mac_hex).ok()?;
    keyed_mac(secret, payload)?.verify_slice(&expected).ok()?;

    let (level, message_hex) = payload.split_once('.')?;
    let message = String::from_utf8(hex::decode(message_hex).ok()?).ok()?;
    Some(FlashMessage {
        level: FlashLevel::parse(level)?,
        message,
    })
}

/// `Set-Cookie` value carrying a flash to the next page
pub fn set_cookie(secret: &[u8], flash: &FlashMessage) -> Option<String> {
    let value = encode(secret, flash)?;
    Some(format!("{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax"))
}

/// `Set-Cookie` value that removes the flash once shown
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Find and verify the flash cookie in request headers
pub fn from_headers(headers: &HeaderMap, secret: &[u8]) -> Option<FlashMessage> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| decode(secret, value))
}
