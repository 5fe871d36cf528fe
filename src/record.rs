//! Record pipeline: split plaintext into padded records and seal them, or
//! walk ciphertext records, open them, and reassemble the plaintext.

extern crate alloc;
use alloc::vec::Vec;

use core::mem;

use zeroize::Zeroizing;

use crate::aead;
use crate::error::Error;
use crate::kdf::KeyAndNonce;
use crate::scheme::Scheme;
use crate::wire::TAG_LENGTH;

/// Upper bound on the ciphertext produced by sealing, excluding any header.
/// Zero when `rs` does not leave room for the delimiter and tag.
pub(crate) fn ciphertext_max_length(
    rs: u32,
    pad_size: usize,
    pad_len: usize,
    plaintext_len: usize,
) -> usize {
    let overhead = pad_size + TAG_LENGTH;
    let rs = rs as usize;
    if rs <= overhead {
        return 0;
    }
    let data_len = plaintext_len + pad_len;
    let data_per_block = rs - overhead;
    let num_records = data_len / data_per_block + 1;
    data_len + overhead * num_records
}

/// Upper bound on the plaintext recovered from `ciphertext_len` bytes of
/// records. The actual output may be smaller because of padding.
pub(crate) fn plaintext_max_length(rs: u32, ciphertext_len: usize) -> usize {
    if rs == 0 {
        return 0;
    }
    let num_records = ciphertext_len / rs as usize + 1;
    ciphertext_len.saturating_sub(TAG_LENGTH * num_records)
}

pub(crate) fn seal<S: Scheme>(
    keys: &KeyAndNonce,
    rs: u32,
    mut pad_len: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let overhead = S::PAD_SIZE + TAG_LENGTH;
    if rs as usize <= overhead {
        return Err(Error::InvalidRecordSize);
    }
    if plaintext.is_empty() {
        return Err(Error::ZeroPlaintext);
    }

    let data_per_block = rs as usize - overhead;
    let max_len = ciphertext_max_length(rs, S::PAD_SIZE, pad_len, plaintext.len());
    let mut ciphertext = Vec::with_capacity(max_len);
    let cipher = aead::cipher(&keys.key);

    let mut plaintext_start = 0;
    let mut counter: u64 = 0;
    loop {
        let block_pad_len = S::min_block_pad_len(pad_len, data_per_block);
        pad_len -= block_pad_len;

        // Fill the rest of the record with plaintext.
        let plaintext_end =
            (plaintext_start + data_per_block - block_pad_len).min(plaintext.len());
        let plaintext_exhausted = plaintext_end == plaintext.len();
        let block_plaintext = &plaintext[plaintext_start..plaintext_end];
        let block_len = block_plaintext.len() + block_pad_len;

        // The last record is reached once the padding and plaintext are
        // spent and no empty trailing record is required.
        let record_end = ciphertext.len() + block_len + overhead;
        let last_record =
            pad_len == 0 && plaintext_exhausted && !S::needs_trailer(rs, record_end);

        if !last_record && block_len < data_per_block {
            // Padding is left over but the plaintext cannot fill a full
            // record; trailing padding-only records would leak the message
            // size, so the caller has to pick a smaller padding length.
            return Err(Error::EncryptPadding);
        }

        let iv = aead::generate_iv(&keys.nonce, counter);
        let block = S::build_block(block_plaintext, block_pad_len, last_record);
        let record = aead::seal_record(&cipher, &iv, &block)?;
        ciphertext.extend_from_slice(&record);

        if last_record {
            break;
        }
        plaintext_start = plaintext_end;
        counter = counter.checked_add(1).ok_or(Error::Encrypt)?;
    }

    Ok(ciphertext)
}

pub(crate) fn open<S: Scheme>(
    keys: &KeyAndNonce,
    rs: u32,
    ciphertext: &[u8],
) -> Result<Vec<u8>, Error> {
    let overhead = S::PAD_SIZE + TAG_LENGTH;
    if rs as usize <= overhead {
        return Err(Error::InvalidRecordSize);
    }
    if ciphertext.is_empty() {
        return Err(Error::ZeroCiphertext);
    }

    let rs = rs as usize;
    let cipher = aead::cipher(&keys.key);
    let mut plaintext =
        Zeroizing::new(Vec::with_capacity(plaintext_max_length(rs as u32, ciphertext.len())));

    let mut record_start = 0;
    let mut counter: u64 = 0;
    while record_start < ciphertext.len() {
        let record_end = (record_start + rs).min(ciphertext.len());
        let record = &ciphertext[record_start..record_end];
        if record.len() <= TAG_LENGTH {
            return Err(Error::ShortBlock);
        }

        let iv = aead::generate_iv(&keys.nonce, counter);
        let mut block = Zeroizing::new(aead::open_record(&cipher, &iv, record)?);
        let is_last_record = record_end == ciphertext.len();
        S::unpad(&mut block, is_last_record)?;
        plaintext.extend_from_slice(&block);

        record_start = record_end;
        counter = counter.checked_add(1).ok_or(Error::Decrypt)?;
    }

    Ok(mem::take(&mut *plaintext))
}
