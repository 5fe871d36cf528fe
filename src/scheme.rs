//! Per-scheme behavior: record layout, padding policy, and trailer rules.
//!
//! aes128gcm records put the plaintext first, then a delimiter byte (0x02
//! in the last record, 0x01 otherwise), then zero padding. aesgcm records
//! put a big-endian u16 padding length first, then that many zeros, then
//! the plaintext.

extern crate alloc;
use alloc::vec::Vec;

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::Error;

/// Behavior that differs between the two content encodings.
pub(crate) trait Scheme {
    /// Width of the delimiter byte (aes128gcm) or pad-length field (aesgcm).
    const PAD_SIZE: usize;

    /// Padding to place in the next record, keeping room for at least one
    /// plaintext byte whenever possible.
    fn min_block_pad_len(pad_len: usize, data_per_block: usize) -> usize;

    /// Whether a ciphertext of this length must be followed by an
    /// all-padding record to defeat truncation.
    fn needs_trailer(rs: u32, ciphertext_len: usize) -> bool;

    /// Lay out one record's plaintext and padding, ready for sealing.
    fn build_block(plaintext: &[u8], block_pad_len: usize, last_record: bool) -> Zeroizing<Vec<u8>>;

    /// Strip padding from a decrypted block, leaving only plaintext bytes.
    fn unpad(block: &mut Vec<u8>, is_last_record: bool) -> Result<(), Error>;
}

/// The RFC 8188 "aes128gcm" encoding.
pub(crate) struct Aes128GcmScheme;

/// The legacy "aesgcm" encoding.
pub(crate) struct AesGcmScheme;

fn base_min_block_pad_len(pad_len: usize, data_per_block: usize) -> usize {
    let mut block_pad_len = data_per_block - 1;
    if pad_len > 0 && block_pad_len == 0 {
        // A one-byte data block can only hold the padding itself.
        block_pad_len += 1;
    }
    block_pad_len.min(pad_len)
}

impl Scheme for Aes128GcmScheme {
    const PAD_SIZE: usize = 1;

    fn min_block_pad_len(pad_len: usize, data_per_block: usize) -> usize {
        base_min_block_pad_len(pad_len, data_per_block)
    }

    fn needs_trailer(_rs: u32, _ciphertext_len: usize) -> bool {
        false
    }

    fn build_block(plaintext: &[u8], block_pad_len: usize, last_record: bool) -> Zeroizing<Vec<u8>> {
        let mut block = Zeroizing::new(Vec::with_capacity(
            plaintext.len() + Self::PAD_SIZE + block_pad_len,
        ));
        block.extend_from_slice(plaintext);
        block.push(if last_record { 2 } else { 1 });
        block.resize(plaintext.len() + Self::PAD_SIZE + block_pad_len, 0);
        block
    }

    fn unpad(block: &mut Vec<u8>, is_last_record: bool) -> Result<(), Error> {
        let delimiter = if is_last_record { 2 } else { 1 };
        while let Some(byte) = block.pop() {
            if byte == 0 {
                continue;
            }
            if byte != delimiter {
                return Err(Error::DecryptPadding);
            }
            return Ok(());
        }
        // Nothing but zeros in the whole record.
        Err(Error::ZeroPlaintext)
    }
}

impl Scheme for AesGcmScheme {
    const PAD_SIZE: usize = 2;

    fn min_block_pad_len(pad_len: usize, data_per_block: usize) -> usize {
        // The wire field for the block padding is a u16.
        base_min_block_pad_len(pad_len, data_per_block).min(u16::MAX as usize)
    }

    fn needs_trailer(rs: u32, ciphertext_len: usize) -> bool {
        ciphertext_len % (rs as usize) == 0
    }

    fn build_block(plaintext: &[u8], block_pad_len: usize, _last_record: bool) -> Zeroizing<Vec<u8>> {
        let mut block = Zeroizing::new(Vec::with_capacity(
            Self::PAD_SIZE + block_pad_len + plaintext.len(),
        ));
        block.extend_from_slice(&(block_pad_len as u16).to_be_bytes());
        block.resize(Self::PAD_SIZE + block_pad_len, 0);
        block.extend_from_slice(plaintext);
        block
    }

    fn unpad(block: &mut Vec<u8>, _is_last_record: bool) -> Result<(), Error> {
        if block.len() < Self::PAD_SIZE {
            return Err(Error::DecryptPadding);
        }
        let pad_len = u16::from_be_bytes([block[0], block[1]]) as usize;
        let offset = Self::PAD_SIZE + pad_len;
        if offset > block.len() {
            return Err(Error::DecryptPadding);
        }
        let mut acc = 0u8;
        for &byte in &block[Self::PAD_SIZE..offset] {
            acc |= byte;
        }
        if acc.ct_eq(&0).unwrap_u8() == 0 {
            return Err(Error::DecryptPadding);
        }
        block.drain(..offset);
        Ok(())
    }
}
