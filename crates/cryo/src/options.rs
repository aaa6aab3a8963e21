//! Freeze and thaw options.

use std::fmt;
use std::sync::Arc;

use crate::compress::Compressor;
use crate::crypto::Encryptor;

/// How the freeze pipeline selects a compressor (and how thaw resolves a
/// header's compressor id).
#[derive(Clone, Default)]
pub enum CompressorChoice {
    /// Let the pipeline decide: LZ4 for large payloads (or always, when
    /// headerless), honoring any installed auto-compressor hook.
    #[default]
    Auto,
    /// Never compress; on thaw, ignore any declared compressor.
    Off,
    /// Use this implementation.
    Use(Arc<dyn Compressor>),
    /// Ask this hook to pick a compressor from the raw payload
    /// ("compress only if large"-style policies). Freeze-side only; thaw
    /// treats it as [`Self::Auto`].
    Choose(Arc<dyn Fn(&[u8]) -> Option<Arc<dyn Compressor>> + Send + Sync>),
}

impl fmt::Debug for CompressorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Off => f.write_str("Off"),
            Self::Use(c) => write!(f, "Use({})", c.id().name()),
            Self::Choose(_) => f.write_str("Choose(..)"),
        }
    }
}

/// How the pipeline selects an encryptor. Encryption happens only when a
/// password is supplied.
#[derive(Clone, Default)]
pub enum EncryptorChoice {
    /// The standard AES-128-GCM/SHA-512 encryptor.
    #[default]
    Auto,
    /// Never encrypt, even with a password present.
    Off,
    /// Use this implementation.
    Use(Arc<dyn Encryptor>),
}

impl fmt::Debug for EncryptorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Off => f.write_str("Off"),
            Self::Use(e) => write!(f, "Use({})", e.id().name()),
        }
    }
}

/// Options for [`freeze`](crate::freeze).
#[derive(Clone, Debug, Default)]
pub struct FreezeOptions {
    /// Compressor selection.
    pub compressor: CompressorChoice,
    /// Encryptor selection; active only with a password.
    pub encryptor: EncryptorChoice,
    /// Key material. Absent means no encryption.
    pub password: Option<Vec<u8>>,
    /// Suppress the 4-byte header; the caller manages the compressor and
    /// encryptor out-of-band.
    pub no_header: bool,
}

impl FreezeOptions {
    /// Default options: auto compression, standard encryptor, no password,
    /// headered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compressor selection.
    #[must_use]
    pub fn compressor(mut self, choice: CompressorChoice) -> Self {
        self.compressor = choice;
        self
    }

    /// Sets the encryptor selection.
    #[must_use]
    pub fn encryptor(mut self, choice: EncryptorChoice) -> Self {
        self.encryptor = choice;
        self
    }

    /// Supplies key material, enabling encryption.
    #[must_use]
    pub fn password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Suppresses the header.
    #[must_use]
    pub fn no_header(mut self) -> Self {
        self.no_header = true;
        self
    }
}

/// Options for [`thaw`](crate::thaw).
#[derive(Clone, Debug, Default)]
pub struct ThawOptions {
    /// Compressor resolution.
    pub compressor: CompressorChoice,
    /// Encryptor resolution.
    pub encryptor: EncryptorChoice,
    /// Key material for encrypted streams.
    pub password: Option<Vec<u8>>,
    /// Attempt legacy (v1) decoding paths on headerless data.
    pub v1_compatibility: bool,
    /// Treat the entire input as a bare payload; never look for a header.
    pub no_header: bool,
}

impl ThawOptions {
    /// Default options: resolve from the header, no password, no legacy
    /// paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compressor resolution.
    #[must_use]
    pub fn compressor(mut self, choice: CompressorChoice) -> Self {
        self.compressor = choice;
        self
    }

    /// Sets the encryptor resolution.
    #[must_use]
    pub fn encryptor(mut self, choice: EncryptorChoice) -> Self {
        self.encryptor = choice;
        self
    }

    /// Supplies key material for decryption.
    #[must_use]
    pub fn password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enables legacy (v1) decoding paths.
    #[must_use]
    pub fn v1_compatibility(mut self) -> Self {
        self.v1_compatibility = true;
        self
    }

    /// Treats the input as a bare payload.
    #[must_use]
    pub fn no_header(mut self) -> Self {
        self.no_header = true;
        self
    }
}
