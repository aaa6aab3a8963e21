//! Authenticated encryption behind a stable-identifier seam.
//!
//! Encryptors are opaque authenticated codecs over the (possibly
//! compressed) payload; the header records only their [`EncryptorId`].
//! The standard implementation is AES-128-GCM with the key derived by
//! SHA-512 from the password. Cipher state is constructed per operation;
//! nothing is shared across threads.

use std::sync::Arc;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes128Gcm, Nonce};
use sha2::{Digest, Sha512};

use crate::error::{Error, Result};

/// Stable encryptor identity recorded in the stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptorId {
    /// AES-128-GCM with a SHA-512-derived key.
    Aes128Sha512,
    /// A caller-supplied implementation the header cannot name.
    Custom,
}

impl EncryptorId {
    /// The id's display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Aes128Sha512 => "aes128-sha512",
            Self::Custom => "custom",
        }
    }
}

/// An opaque authenticated codec keyed by a password.
pub trait Encryptor: Send + Sync {
    /// The stable identifier recorded in the stream header.
    fn id(&self) -> EncryptorId;

    /// Encrypts `plaintext` under `password`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] when the primitive fails.
    fn encrypt(&self, password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts and authenticates `ciphertext` under `password`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] when authentication fails — a wrong
    /// password and tampered data are indistinguishable here.
    fn decrypt(&self, password: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// The standard encryptor: AES-128-GCM, key = SHA-512(password) truncated
/// to 128 bits, fresh random 96-bit nonce prepended to the ciphertext.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes128Sha512;

const NONCE_LEN: usize = 12;

fn cipher_for(password: &[u8]) -> Result<Aes128Gcm> {
    let digest = Sha512::digest(password);
    Aes128Gcm::new_from_slice(&digest[..16]).map_err(|_| Error::Crypto { op: "key setup" })
}

impl Encryptor for Aes128Sha512 {
    fn id(&self) -> EncryptorId {
        EncryptorId::Aes128Sha512
    }

    fn encrypt(&self, password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = cipher_for(password)?;
        let nonce = Aes128Gcm::generate_nonce(&mut OsRng);
        let sealed =
            cipher.encrypt(&nonce, plaintext).map_err(|_| Error::Crypto { op: "encryption" })?;
        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, password: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN {
            return Err(Error::Crypto { op: "decryption" });
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        cipher_for(password)?
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| Error::Crypto { op: "decryption" })
    }
}

/// The standard implementation for a header id, when one exists.
pub(crate) fn standard(id: EncryptorId) -> Option<Arc<dyn Encryptor>> {
    match id {
        EncryptorId::Aes128Sha512 => Some(Arc::new(Aes128Sha512)),
        EncryptorId::Custom => None,
    }
}
