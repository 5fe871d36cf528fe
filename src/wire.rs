//! Wire-format constants and the aes128gcm payload header.
//!
//! aes128gcm payload layout:
//!   salt[16] || rs[4, big-endian] || key_id_len[1] || key_id[0..=255]
//!   || ciphertext records
//!
//! For Web Push the key identifier is the sender's uncompressed P-256
//! public point (65 bytes).

extern crate alloc;
use alloc::vec::Vec;

use crate::error::Error;

/// Per-message salt size.
pub const SALT_LENGTH: usize = 16;

/// AES-128 content encryption key size.
pub const KEY_LENGTH: usize = 16;

/// Base nonce / per-record IV size.
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag size.
pub const TAG_LENGTH: usize = 16;

/// Web Push auth secret size.
pub const AUTH_SECRET_LENGTH: usize = 16;

/// P-256 private scalar size.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Uncompressed P-256 public point size (0x04 || X || Y).
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Fixed aes128gcm header size: salt + rs + key_id_len.
pub const HEADER_LENGTH: usize = SALT_LENGTH + 4 + 1; // 21

/// The key identifier length field is a single byte.
pub const MAX_KEY_ID_LENGTH: usize = 255;

/// Record size assumed when the legacy `Encryption` header omits `rs`.
pub const DEFAULT_RS: u32 = 4096;

/// Borrowed view of a parsed aes128gcm payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub salt: &'a [u8; SALT_LENGTH],
    pub rs: u32,
    pub key_id: &'a [u8],
    pub ciphertext: &'a [u8],
}

pub fn decode_header(payload: &[u8]) -> Result<Header<'_>, Error> {
    if payload.len() < HEADER_LENGTH {
        return Err(Error::InvalidHeader);
    }

    let salt: &[u8; SALT_LENGTH] = payload[..SALT_LENGTH]
        .try_into()
        .map_err(|_| Error::InvalidHeader)?;
    let rs = u32::from_be_bytes([
        payload[SALT_LENGTH],
        payload[SALT_LENGTH + 1],
        payload[SALT_LENGTH + 2],
        payload[SALT_LENGTH + 3],
    ]);
    let key_id_len = payload[HEADER_LENGTH - 1] as usize;

    let ciphertext_start = HEADER_LENGTH + key_id_len;
    if payload.len() < ciphertext_start {
        return Err(Error::InvalidHeader);
    }

    Ok(Header {
        salt,
        rs,
        key_id: &payload[HEADER_LENGTH..ciphertext_start],
        ciphertext: &payload[ciphertext_start..],
    })
}

/// Write the fixed header and key identifier, reserving room for
/// `ciphertext_len` bytes of records to follow.
pub fn encode_header(
    salt: &[u8; SALT_LENGTH],
    rs: u32,
    key_id: &[u8],
    ciphertext_len: usize,
) -> Result<Vec<u8>, Error> {
    if key_id.len() > MAX_KEY_ID_LENGTH {
        return Err(Error::InvalidHeader);
    }

    let mut payload = Vec::with_capacity(HEADER_LENGTH + key_id.len() + ciphertext_len);
    payload.extend_from_slice(salt);
    payload.extend_from_slice(&rs.to_be_bytes());
    payload.push(key_id.len() as u8);
    payload.extend_from_slice(key_id);
    Ok(payload)
}
