//! AES-128-GCM sealing and opening of single records, plus per-record IVs.

extern crate alloc;
use alloc::vec::Vec;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Key, Nonce,
};
use getrandom::getrandom;

use crate::error::Error;
use crate::wire::{KEY_LENGTH, NONCE_LENGTH, SALT_LENGTH};

/// Generate a random 16-byte message salt. Used during encryption only.
pub(crate) fn generate_salt() -> Result<[u8; SALT_LENGTH], Error> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom(&mut salt).map_err(|_| Error::InvalidSalt)?;
    Ok(salt)
}

pub(crate) fn cipher(key: &[u8; KEY_LENGTH]) -> Aes128Gcm {
    Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key))
}

/// Derive the IV for one record: XOR the big-endian counter into the low
/// 8 bytes of the base nonce. The high 4 bytes pass through unchanged.
pub(crate) fn generate_iv(nonce: &[u8; NONCE_LENGTH], counter: u64) -> [u8; NONCE_LENGTH] {
    let mut iv = *nonce;
    let counter = counter.to_be_bytes();
    for (b, c) in iv[NONCE_LENGTH - 8..].iter_mut().zip(counter.iter()) {
        *b ^= c;
    }
    iv
}

/// Seal one padded block; the 16-byte tag is appended to the result.
pub(crate) fn seal_record(
    cipher: &Aes128Gcm,
    iv: &[u8; NONCE_LENGTH],
    block: &[u8],
) -> Result<Vec<u8>, Error> {
    let nonce = Nonce::from_slice(iv);
    cipher.encrypt(nonce, block).map_err(|_| Error::Encrypt)
}

/// Open one record (ciphertext body followed by the 16-byte tag).
pub(crate) fn open_record(
    cipher: &Aes128Gcm,
    iv: &[u8; NONCE_LENGTH],
    record: &[u8],
) -> Result<Vec<u8>, Error> {
    let nonce = Nonce::from_slice(iv);
    cipher.decrypt(nonce, record).map_err(|_| Error::Decrypt)
}
