//! Legacy `Crypto-Key` / `Encryption` header parameters for aesgcm.
//!
//! Both headers hold `;`-separated `name=value` parameters; a header may
//! carry several comma-separated parameter lists for different keys. Names
//! are case-insensitive and values may be double-quoted. When both headers
//! carry a `keyid`, it links the `dh` entry to the `salt`/`rs` entry.

extern crate alloc;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::Error;
use crate::wire::{DEFAULT_RS, PUBLIC_KEY_LENGTH, SALT_LENGTH};

/// Message parameters carried out-of-band by the legacy headers.
#[derive(Debug, Clone)]
pub(crate) struct AesGcmParams {
    pub salt: [u8; SALT_LENGTH],
    pub rs: u32,
    pub sender_pub: [u8; PUBLIC_KEY_LENGTH],
}

/// Header values to send alongside an aesgcm ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesGcmHeaders {
    /// `Crypto-Key` header value: carries the sender's public key as `dh`.
    pub crypto_key: String,
    /// `Encryption` header value: carries the message salt and record size.
    pub encryption: String,
}

pub(crate) fn build_headers(
    sender_pub: &[u8; PUBLIC_KEY_LENGTH],
    salt: &[u8; SALT_LENGTH],
    rs: u32,
) -> AesGcmHeaders {
    AesGcmHeaders {
        crypto_key: format!("keyid=p256dh; dh={}", URL_SAFE_NO_PAD.encode(sender_pub)),
        encryption: format!(
            "keyid=p256dh; salt={}; rs={}",
            URL_SAFE_NO_PAD.encode(salt),
            rs
        ),
    }
}

pub(crate) fn extract_params(
    crypto_key_header: &str,
    encryption_header: &str,
) -> Result<AesGcmParams, Error> {
    let mut salt_value = None;
    let mut rs_value = None;
    let mut key_id = None;
    for section in encryption_header.split(',') {
        let pairs = parse_section(section)?;
        if let Some(salt) = find(&pairs, "salt") {
            salt_value = Some(salt);
            rs_value = find(&pairs, "rs");
            key_id = find(&pairs, "keyid");
            break;
        }
    }
    let salt_value = salt_value.ok_or(Error::InvalidHeader)?;

    let mut dh_value = None;
    for section in crypto_key_header.split(',') {
        let pairs = parse_section(section)?;
        let dh = match find(&pairs, "dh") {
            Some(dh) => dh,
            None => continue,
        };
        // Only match entries for another key when both sides name one.
        if let (Some(want), Some(have)) = (key_id, find(&pairs, "keyid")) {
            if want != have {
                continue;
            }
        }
        dh_value = Some(dh);
        break;
    }
    let dh_value = dh_value.ok_or(Error::InvalidHeader)?;

    let salt = decode_base64url(salt_value)?
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidSalt)?;
    let rs = match rs_value {
        Some(value) => value.parse::<u32>().map_err(|_| Error::InvalidHeader)?,
        None => DEFAULT_RS,
    };
    let sender_pub = decode_base64url(dh_value)?
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidPublicKey)?;

    Ok(AesGcmParams { salt, rs, sender_pub })
}

fn parse_section(section: &str) -> Result<Vec<(&str, &str)>, Error> {
    let mut pairs = Vec::new();
    for param in section.split(';') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (name, value) = param.split_once('=').ok_or(Error::InvalidHeader)?;
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        if name.is_empty() || value.is_empty() {
            return Err(Error::InvalidHeader);
        }
        pairs.push((name, value));
    }
    Ok(pairs)
}

fn find<'a>(pairs: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| *v)
}

fn decode_base64url(value: &str) -> Result<Vec<u8>, Error> {
    // Tolerate padded input; the emitted form is unpadded.
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|_| Error::InvalidHeader)
}
