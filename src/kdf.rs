//! HKDF-SHA256 cascades deriving the content encryption key and base nonce.
//!
//! aes128gcm (RFC 8188):
//!   CEK   = HKDF(salt, ikm, "Content-Encoding: aes128gcm\0", 16)
//!   nonce = HKDF(salt, ikm, "Content-Encoding: nonce\0", 12)
//!
//! Web Push aes128gcm (RFC 8291) prepends an IKM derivation from ECDH:
//!   ikm = HKDF(auth_secret, ecdh, "WebPush: info\0" || recv_pub || sender_pub, 32)
//!
//! Web Push aesgcm (legacy draft) uses its own cascade; both of its infos
//! carry the two public points with 2-byte big-endian length prefixes.
//!
//! The recipient public key is always the subscriber's, regardless of which
//! side is running the derivation.

extern crate alloc;
use alloc::vec::Vec;

use hkdf::Hkdf;
use p256::{PublicKey, SecretKey};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::Error;
use crate::keys;
use crate::wire::{KEY_LENGTH, NONCE_LENGTH, PUBLIC_KEY_LENGTH, SALT_LENGTH};

const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";
const WEBPUSH_IKM_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const AESGCM_IKM_INFO: &[u8] = b"Content-Encoding: auth\0";
const AESGCM_CEK_INFO_PREFIX: &[u8] = b"Content-Encoding: aesgcm\0";
const AESGCM_NONCE_INFO_PREFIX: &[u8] = b"Content-Encoding: nonce\0";

// Big-endian length prefix for a 65-byte public point.
const POINT_LENGTH_PREFIX: [u8; 2] = [0x00, 0x41];

/// Which side of the exchange is running the derivation. Decides which of
/// the local and remote keys is the subscriber's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Encrypt,
    Decrypt,
}

/// Content encryption key and base nonce. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct KeyAndNonce {
    pub key: [u8; KEY_LENGTH],
    pub nonce: [u8; NONCE_LENGTH],
}

pub(crate) fn aes128gcm_key_and_nonce(
    salt: &[u8; SALT_LENGTH],
    ikm: &[u8],
) -> Result<KeyAndNonce, Error> {
    let hk = Hkdf::<Sha256>::new(Some(&salt[..]), ikm);
    let mut key = [0u8; KEY_LENGTH];
    hk.expand(CEK_INFO, &mut key).map_err(|_| Error::KeyDerivation)?;
    let mut nonce = [0u8; NONCE_LENGTH];
    hk.expand(NONCE_INFO, &mut nonce).map_err(|_| Error::KeyDerivation)?;
    Ok(KeyAndNonce { key, nonce })
}

pub(crate) fn webpush_aes128gcm_key_and_nonce(
    mode: Mode,
    local: &SecretKey,
    remote: &PublicKey,
    auth_secret: &[u8],
    salt: &[u8; SALT_LENGTH],
) -> Result<KeyAndNonce, Error> {
    let ikm = webpush_ikm(mode, local, remote, auth_secret)?;
    aes128gcm_key_and_nonce(salt, &ikm[..])
}

pub(crate) fn webpush_aesgcm_key_and_nonce(
    mode: Mode,
    local: &SecretKey,
    remote: &PublicKey,
    auth_secret: &[u8],
    salt: &[u8; SALT_LENGTH],
) -> Result<KeyAndNonce, Error> {
    let shared = keys::shared_secret(local, remote);
    let hk = Hkdf::<Sha256>::new(Some(auth_secret), &shared[..]);
    let mut ikm = Zeroizing::new([0u8; 32]);
    hk.expand(AESGCM_IKM_INFO, &mut ikm[..])
        .map_err(|_| Error::KeyDerivation)?;

    let (recv_pub, sender_pub) = recv_and_sender_keys(mode, local, remote)?;
    let hk = Hkdf::<Sha256>::new(Some(&salt[..]), &ikm[..]);
    let mut key = [0u8; KEY_LENGTH];
    hk.expand(
        &prefixed_points_info(AESGCM_CEK_INFO_PREFIX, &recv_pub, &sender_pub),
        &mut key,
    )
    .map_err(|_| Error::KeyDerivation)?;
    let mut nonce = [0u8; NONCE_LENGTH];
    hk.expand(
        &prefixed_points_info(AESGCM_NONCE_INFO_PREFIX, &recv_pub, &sender_pub),
        &mut nonce,
    )
    .map_err(|_| Error::KeyDerivation)?;
    Ok(KeyAndNonce { key, nonce })
}

fn webpush_ikm(
    mode: Mode,
    local: &SecretKey,
    remote: &PublicKey,
    auth_secret: &[u8],
) -> Result<Zeroizing<[u8; 32]>, Error> {
    let shared = keys::shared_secret(local, remote);
    let (recv_pub, sender_pub) = recv_and_sender_keys(mode, local, remote)?;

    let mut info = Vec::with_capacity(WEBPUSH_IKM_INFO_PREFIX.len() + 2 * PUBLIC_KEY_LENGTH);
    info.extend_from_slice(WEBPUSH_IKM_INFO_PREFIX);
    info.extend_from_slice(&recv_pub);
    info.extend_from_slice(&sender_pub);

    let hk = Hkdf::<Sha256>::new(Some(auth_secret), &shared[..]);
    let mut ikm = Zeroizing::new([0u8; 32]);
    hk.expand(&info, &mut ikm[..]).map_err(|_| Error::KeyDerivation)?;
    Ok(ikm)
}

/// Order the two public points as (recipient, sender). The recipient key is
/// ours when decrypting and the peer's when encrypting.
fn recv_and_sender_keys(
    mode: Mode,
    local: &SecretKey,
    remote: &PublicKey,
) -> Result<([u8; PUBLIC_KEY_LENGTH], [u8; PUBLIC_KEY_LENGTH]), Error> {
    let local_pub = keys::export_public_key(&local.public_key())?;
    let remote_pub = keys::export_public_key(remote)?;
    Ok(match mode {
        Mode::Encrypt => (remote_pub, local_pub),
        Mode::Decrypt => (local_pub, remote_pub),
    })
}

fn prefixed_points_info(
    prefix: &[u8],
    recv_pub: &[u8; PUBLIC_KEY_LENGTH],
    sender_pub: &[u8; PUBLIC_KEY_LENGTH],
) -> Vec<u8> {
    let mut info = Vec::with_capacity(prefix.len() + 2 * (2 + PUBLIC_KEY_LENGTH));
    info.extend_from_slice(prefix);
    info.extend_from_slice(&POINT_LENGTH_PREFIX);
    info.extend_from_slice(recv_pub);
    info.extend_from_slice(&POINT_LENGTH_PREFIX);
    info.extend_from_slice(sender_pub);
    info
}
