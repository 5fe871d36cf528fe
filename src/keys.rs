//! P-256 key handling: import, export, generation, and ECDH.

use p256::ecdh;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::wire::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH};

pub(crate) fn import_private_key(raw: &[u8]) -> Result<SecretKey, Error> {
    if raw.len() != PRIVATE_KEY_LENGTH {
        return Err(Error::InvalidPrivateKey);
    }
    SecretKey::from_slice(raw).map_err(|_| Error::InvalidPrivateKey)
}

pub(crate) fn import_public_key(raw: &[u8]) -> Result<PublicKey, Error> {
    if raw.len() != PUBLIC_KEY_LENGTH {
        return Err(Error::InvalidPublicKey);
    }
    PublicKey::from_sec1_bytes(raw).map_err(|_| Error::InvalidPublicKey)
}

pub(crate) fn generate_keypair() -> (SecretKey, PublicKey) {
    let secret = SecretKey::random(&mut OsRng);
    let public = secret.public_key();
    (secret, public)
}

/// Serialize as an uncompressed SEC1 point (0x04 || X || Y).
pub(crate) fn export_public_key(key: &PublicKey) -> Result<[u8; PUBLIC_KEY_LENGTH], Error> {
    let point = key.to_encoded_point(false);
    let bytes = point.as_bytes();
    if bytes.len() != PUBLIC_KEY_LENGTH {
        return Err(Error::EncodePublicKey);
    }
    let mut out = [0u8; PUBLIC_KEY_LENGTH];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// ECDH shared secret: the X coordinate of the agreed point.
pub(crate) fn shared_secret(local: &SecretKey, remote: &PublicKey) -> Zeroizing<[u8; 32]> {
    let shared = ecdh::diffie_hellman(local.to_nonzero_scalar(), remote.as_affine());
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(shared.raw_secret_bytes().as_slice());
    out
}
