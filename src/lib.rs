//! # HTTP Encrypted Content-Encoding
//!
//! Authenticated encryption of HTTP message payloads as used by Web Push:
//! the RFC 8188 `aes128gcm` encoding, which carries its parameters in a
//! binary header prefixed to the ciphertext, and the legacy `aesgcm`
//! encoding, which carries them in the `Crypto-Key` and `Encryption`
//! headers.
//!
//! Both encodings derive an AES-128 content encryption key and a base nonce
//! from the input keying material and a per-message salt, split the
//! plaintext into fixed-size records, and seal each record with
//! AES-128-GCM under a counter-derived IV.
//!
//! ## Quick Start
//!
//! ```
//! use http_ece::{aes128gcm_encrypt, generate_keypair, webpush_aes128gcm_decrypt};
//!
//! # fn main() -> Result<(), http_ece::Error> {
//! let (recv_priv, recv_pub) = generate_keypair()?;
//! let auth_secret = [0x42u8; 16];
//!
//! let payload = aes128gcm_encrypt(&recv_pub, &auth_secret, 4096, 0, b"a secret message")?;
//! let plaintext = webpush_aes128gcm_decrypt(&recv_priv, &auth_secret, &payload)?;
//!
//! assert_eq!(plaintext, b"a secret message");
//! # Ok(())
//! # }
//! ```
//!
//! ## Properties
//!
//! - **Truncation defense**: the last record is marked (aes128gcm) or an
//!   all-padding trailer record is appended (aesgcm), so a shortened
//!   payload fails to decrypt.
//! - **Length hiding**: callers may ask for extra padding; configurations
//!   that would still leak the message size are rejected.
//! - **Scoped secrets**: derived keys, nonces, and scratch buffers live for
//!   one call and are wiped on every exit path.
//!
//! ## What's NOT Provided
//!
//! - Streaming decryption of partial payloads
//! - Content-coding negotiation or key rotation
//! - Transport (building the HTTP request is the caller's job)

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/http-ece/0.1.0")]

extern crate alloc;

use alloc::vec::Vec;

mod aead;
mod error;
mod kdf;
mod keys;
mod params;
mod record;
mod scheme;

// Wire constants and the payload header codec are useful for sizing and
// inspection, but are not considered stable API.
#[doc(hidden)]
pub mod wire;

pub use error::Error;
pub use params::AesGcmHeaders;
pub use wire::{
    AUTH_SECRET_LENGTH, DEFAULT_RS, HEADER_LENGTH, KEY_LENGTH, NONCE_LENGTH, PRIVATE_KEY_LENGTH,
    PUBLIC_KEY_LENGTH, SALT_LENGTH, TAG_LENGTH,
};

use kdf::Mode;
use p256::{PublicKey, SecretKey};
use scheme::{Aes128GcmScheme, AesGcmScheme, Scheme};

// ---------------------------------------------------------------------------
// Key generation
// ---------------------------------------------------------------------------

/// Generate a P-256 keypair as raw bytes: the 32-byte private scalar and
/// the 65-byte uncompressed public point.
pub fn generate_keypair() -> Result<([u8; PRIVATE_KEY_LENGTH], [u8; PUBLIC_KEY_LENGTH]), Error> {
    let (secret, public) = keys::generate_keypair();
    let public = keys::export_public_key(&public)?;
    Ok((secret.to_bytes().into(), public))
}

// ---------------------------------------------------------------------------
// aes128gcm
// ---------------------------------------------------------------------------

/// Encrypt a Web Push message with the aes128gcm encoding, generating the
/// message salt and an ephemeral sender keypair internally.
///
/// `rs` is the record size including the authentication tag; `pad_len` is
/// the total number of padding bytes to spread over the records.
pub fn aes128gcm_encrypt(
    recv_pub: &[u8],
    auth_secret: &[u8],
    rs: u32,
    pad_len: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let recv_key = keys::import_public_key(recv_pub)?;
    let (sender_key, _) = keys::generate_keypair();
    let salt = aead::generate_salt()?;
    webpush_aes128gcm_encrypt_inner(&sender_key, &recv_key, auth_secret, &salt, rs, pad_len, plaintext)
}

/// Encrypt a Web Push message with the aes128gcm encoding using a fixed
/// sender key and salt. Deterministic; intended for interoperability tests.
pub fn aes128gcm_encrypt_with_keys(
    sender_priv: &[u8],
    auth_secret: &[u8],
    salt: &[u8],
    recv_pub: &[u8],
    rs: u32,
    pad_len: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let sender_key = keys::import_private_key(sender_priv)?;
    let recv_key = keys::import_public_key(recv_pub)?;
    let salt = check_salt(salt)?;
    webpush_aes128gcm_encrypt_inner(&sender_key, &recv_key, auth_secret, salt, rs, pad_len, plaintext)
}

fn webpush_aes128gcm_encrypt_inner(
    sender_key: &SecretKey,
    recv_key: &PublicKey,
    auth_secret: &[u8],
    salt: &[u8; SALT_LENGTH],
    rs: u32,
    pad_len: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let auth_secret = check_auth_secret(auth_secret)?;
    let keys_material =
        kdf::webpush_aes128gcm_key_and_nonce(Mode::Encrypt, sender_key, recv_key, auth_secret, salt)?;
    let ciphertext = record::seal::<Aes128GcmScheme>(&keys_material, rs, pad_len, plaintext)?;

    // The sender's public point travels in the header as the key id.
    let sender_pub = keys::export_public_key(&sender_key.public_key())?;
    let mut payload = wire::encode_header(salt, rs, &sender_pub, ciphertext.len())?;
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}

/// Decrypt an aes128gcm payload with a pre-shared 16-byte input keying
/// material, outside the Web Push profile.
pub fn aes128gcm_decrypt(ikm: &[u8], payload: &[u8]) -> Result<Vec<u8>, Error> {
    let header = wire::decode_header(payload)?;
    let keys_material = kdf::aes128gcm_key_and_nonce(header.salt, ikm)?;
    record::open::<Aes128GcmScheme>(&keys_material, header.rs, header.ciphertext)
}

/// Decrypt a Web Push aes128gcm payload. The sender's public key is read
/// from the payload header's key id.
pub fn webpush_aes128gcm_decrypt(
    recv_priv: &[u8],
    auth_secret: &[u8],
    payload: &[u8],
) -> Result<Vec<u8>, Error> {
    let header = wire::decode_header(payload)?;
    let recv_key = keys::import_private_key(recv_priv)?;
    let sender_key = keys::import_public_key(header.key_id)?;
    let auth_secret = check_auth_secret(auth_secret)?;
    let keys_material = kdf::webpush_aes128gcm_key_and_nonce(
        Mode::Decrypt,
        &recv_key,
        &sender_key,
        auth_secret,
        header.salt,
    )?;
    record::open::<Aes128GcmScheme>(&keys_material, header.rs, header.ciphertext)
}

// ---------------------------------------------------------------------------
// aesgcm (legacy)
// ---------------------------------------------------------------------------

/// Encrypt a Web Push message with the legacy aesgcm encoding. Returns the
/// ciphertext together with the `Crypto-Key` and `Encryption` header values
/// that carry the message parameters.
///
/// `rs` is the on-the-wire record size, which excludes the authentication
/// tag; each sealed record is `rs + 16` bytes.
pub fn webpush_aesgcm_encrypt_with_keys(
    sender_priv: &[u8],
    auth_secret: &[u8],
    salt: &[u8],
    recv_pub: &[u8],
    rs: u32,
    pad_len: usize,
    plaintext: &[u8],
) -> Result<(Vec<u8>, AesGcmHeaders), Error> {
    let sender_key = keys::import_private_key(sender_priv)?;
    let recv_key = keys::import_public_key(recv_pub)?;
    let salt = check_salt(salt)?;
    let auth_secret = check_auth_secret(auth_secret)?;
    let keys_material =
        kdf::webpush_aesgcm_key_and_nonce(Mode::Encrypt, &sender_key, &recv_key, auth_secret, salt)?;

    let internal_rs = rs
        .checked_add(TAG_LENGTH as u32)
        .ok_or(Error::InvalidRecordSize)?;
    let ciphertext = record::seal::<AesGcmScheme>(&keys_material, internal_rs, pad_len, plaintext)?;

    let sender_pub = keys::export_public_key(&sender_key.public_key())?;
    let headers = params::build_headers(&sender_pub, salt, rs);
    Ok((ciphertext, headers))
}

/// Decrypt a legacy aesgcm ciphertext, taking the message parameters from
/// the `Crypto-Key` and `Encryption` header values.
pub fn webpush_aesgcm_decrypt(
    recv_priv: &[u8],
    auth_secret: &[u8],
    crypto_key_header: &str,
    encryption_header: &str,
    ciphertext: &[u8],
) -> Result<Vec<u8>, Error> {
    let message_params = params::extract_params(crypto_key_header, encryption_header)?;
    let recv_key = keys::import_private_key(recv_priv)?;
    let sender_key = keys::import_public_key(&message_params.sender_pub)?;
    let auth_secret = check_auth_secret(auth_secret)?;
    let keys_material = kdf::webpush_aesgcm_key_and_nonce(
        Mode::Decrypt,
        &recv_key,
        &sender_key,
        auth_secret,
        &message_params.salt,
    )?;

    let internal_rs = message_params
        .rs
        .checked_add(TAG_LENGTH as u32)
        .ok_or(Error::InvalidRecordSize)?;
    record::open::<AesGcmScheme>(&keys_material, internal_rs, ciphertext)
}

// ---------------------------------------------------------------------------
// Sizing queries
// ---------------------------------------------------------------------------

/// Upper bound on the plaintext recovered from an aes128gcm payload, or 0
/// if the header cannot be parsed. The actual plaintext may be shorter
/// because of padding.
pub fn aes128gcm_plaintext_max_length(payload: &[u8]) -> usize {
    match wire::decode_header(payload) {
        Ok(header) => record::plaintext_max_length(header.rs, header.ciphertext.len()),
        Err(_) => 0,
    }
}

/// Upper bound on the plaintext recovered from an aesgcm ciphertext.
pub fn aesgcm_plaintext_max_length(ciphertext: &[u8]) -> usize {
    ciphertext.len()
}

/// Upper bound on the size of an aes128gcm payload, including the header
/// with a maximum-size key id, or 0 if `rs` is too small to hold a record.
pub fn aes128gcm_payload_max_length(rs: u32, pad_len: usize, plaintext_len: usize) -> usize {
    let ciphertext_len =
        record::ciphertext_max_length(rs, Aes128GcmScheme::PAD_SIZE, pad_len, plaintext_len);
    if ciphertext_len == 0 {
        return 0;
    }
    HEADER_LENGTH + wire::MAX_KEY_ID_LENGTH + ciphertext_len
}

/// Upper bound on the size of an aesgcm ciphertext, or 0 if `rs` is too
/// small to hold a record.
pub fn aesgcm_ciphertext_max_length(rs: u32, pad_len: usize, plaintext_len: usize) -> usize {
    record::ciphertext_max_length(rs, AesGcmScheme::PAD_SIZE, pad_len, plaintext_len)
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

fn check_auth_secret(auth_secret: &[u8]) -> Result<&[u8], Error> {
    if auth_secret.len() != AUTH_SECRET_LENGTH {
        return Err(Error::InvalidAuthSecret);
    }
    Ok(auth_secret)
}

fn check_salt(salt: &[u8]) -> Result<&[u8; SALT_LENGTH], Error> {
    salt.try_into().map_err(|_| Error::InvalidSalt)
}
