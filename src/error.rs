//! Unified error type for all codec entry points.

use core::fmt;

/// Errors surfaced by the encrypt and decrypt entry points.
///
/// No partial output is trusted on error; callers must discard anything a
/// failed call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An output buffer or allocation was too small for the result.
    OutOfMemory,
    /// Private key import failed, or key agreement with it failed.
    InvalidPrivateKey,
    /// Public key import failed, or the point is not on the curve.
    InvalidPublicKey,
    /// The auth secret is not 16 bytes.
    InvalidAuthSecret,
    /// The salt is not 16 bytes, or salt generation failed.
    InvalidSalt,
    /// The record size does not leave room for the padding delimiter and tag.
    InvalidRecordSize,
    /// The aes128gcm header is truncated, or its key identifier overruns the
    /// payload. Also covers malformed legacy header parameters.
    InvalidHeader,
    /// The ciphertext is empty.
    ZeroCiphertext,
    /// The plaintext is empty on encrypt, or a record decrypted to all zeros.
    ZeroPlaintext,
    /// A ciphertext record is no longer than the authentication tag.
    ShortBlock,
    /// Authentication tag verification failed.
    Decrypt,
    /// A decrypted record violates the padding invariants.
    DecryptPadding,
    /// The AEAD sealing operation failed.
    Encrypt,
    /// The requested padding would force a trailing padding-only record.
    EncryptPadding,
    /// The sender public key could not be serialized.
    EncodePublicKey,
    /// HKDF or key-agreement failure not attributable to a specific input.
    KeyDerivation,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::InvalidPrivateKey => write!(f, "invalid private key"),
            Self::InvalidPublicKey => write!(f, "invalid public key"),
            Self::InvalidAuthSecret => write!(f, "invalid auth secret"),
            Self::InvalidSalt => write!(f, "invalid salt"),
            Self::InvalidRecordSize => write!(f, "invalid record size"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::ZeroCiphertext => write!(f, "zero-length ciphertext"),
            Self::ZeroPlaintext => write!(f, "zero-length plaintext"),
            Self::ShortBlock => write!(f, "record shorter than authentication tag"),
            Self::Decrypt => write!(f, "decryption failed"),
            Self::DecryptPadding => write!(f, "invalid padding in decrypted record"),
            Self::Encrypt => write!(f, "encryption failed"),
            Self::EncryptPadding => write!(f, "padding would produce a padding-only record"),
            Self::EncodePublicKey => write!(f, "could not encode public key"),
            Self::KeyDerivation => write!(f, "key derivation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
