//! The top-level pipeline: `encode → compress? → encrypt? → header` on
//! freeze, and its inverse on thaw.

use std::sync::{Arc, PoisonError, RwLock};

use cryo_core::{freeze_value, thaw_value, ByteReader, CodecContext, ThawError, Value};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::compress::{self, Compressor, CompressorId, Lz4, Snappy};
use crate::crypto::{self, Aes128Sha512, Encryptor, EncryptorId};
use crate::error::{Error, Result};
use crate::header::{self, Header, HeaderProbe, HEADER_LEN};
use crate::options::{CompressorChoice, EncryptorChoice, FreezeOptions, ThawOptions};

/// Payloads larger than this get LZ4 under `auto` compression.
pub const AUTO_COMPRESS_MIN: usize = 8192;

/// Initial capacity of the top-level scratch buffer.
const SCRATCH_CAPACITY: usize = 64;

/// Signature of the process-wide auto-compressor hook.
pub type AutoCompressorFn = dyn Fn(&[u8]) -> Option<Arc<dyn Compressor>> + Send + Sync;

static AUTO_COMPRESSOR: Lazy<RwLock<Option<Arc<AutoCompressorFn>>>> =
    Lazy::new(|| RwLock::new(None));

/// Installs (or clears) the hook `auto` compression consults on headered
/// freezes, before falling back to the size threshold.
pub fn set_auto_compressor(hook: Option<Arc<AutoCompressorFn>>) {
    let mut guard = AUTO_COMPRESSOR.write().unwrap_or_else(PoisonError::into_inner);
    *guard = hook;
}

fn auto_compressor() -> Option<Arc<AutoCompressorFn>> {
    AUTO_COMPRESSOR.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Freezes a value to bytes using the process-wide default context.
///
/// # Errors
///
/// Returns [`Error`] when serialization, compression, or encryption
/// fails, or when the selected compressor/encryptor pair has no header id.
pub fn freeze(value: &Value, opts: &FreezeOptions) -> Result<Vec<u8>> {
    freeze_with(CodecContext::global(), value, opts)
}

/// [`freeze`] against an explicit codec context.
///
/// # Errors
///
/// See [`freeze`].
pub fn freeze_with(ctx: &CodecContext, value: &Value, opts: &FreezeOptions) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(SCRATCH_CAPACITY);
    freeze_value(value, &mut body, ctx)?;

    let compressor = select_compressor(&body, opts);
    if let Some(c) = &compressor {
        body = c.compress(&body)?;
    }

    let encryptor = select_encryptor(opts);
    if let Some((enc, password)) = &encryptor {
        body = enc.encrypt(password, &body)?;
    }

    if opts.no_header {
        return Ok(body);
    }
    let compressor_id = compressor.map(|c| c.id());
    let encryptor_id = encryptor.map(|(e, _)| e.id());
    let meta = header::meta_byte(compressor_id, encryptor_id).ok_or(
        Error::UnsupportedHeaderCombination {
            compressor: compressor_name(compressor_id),
            encryptor: encryptor_name(encryptor_id),
        },
    )?;
    Ok(header::prepend(meta, &body))
}

/// Thaws bytes back into a value using the process-wide default context.
///
/// # Errors
///
/// Returns [`Error`] for unrecognized headers, missing passwords or
/// custom implementations, and any decode failure (wrapped with pipeline
/// breadcrumbs).
pub fn thaw(bytes: &[u8], opts: &ThawOptions) -> Result<Value> {
    thaw_with(CodecContext::global(), bytes, opts)
}

/// [`thaw`] against an explicit codec context.
///
/// # Errors
///
/// See [`thaw`].
pub fn thaw_with(ctx: &CodecContext, bytes: &[u8], opts: &ThawOptions) -> Result<Value> {
    if opts.no_header {
        return thaw_headerless(ctx, bytes, opts);
    }
    match header::probe(bytes) {
        HeaderProbe::Absent => thaw_headerless(ctx, bytes, opts),
        HeaderProbe::Unrecognized(meta) => {
            if opts.v1_compatibility {
                debug!(header_meta = meta, "unrecognized header; trying legacy headerless decoding");
                thaw_headerless(ctx, bytes, opts)
            } else {
                Err(Error::UnrecognizedHeader { meta })
            }
        }
        HeaderProbe::Present(h) => thaw_headered(ctx, &bytes[HEADER_LEN..], h, opts),
    }
}

fn compressor_name(id: Option<CompressorId>) -> &'static str {
    id.map_or("none", CompressorId::name)
}

fn encryptor_name(id: Option<EncryptorId>) -> &'static str {
    id.map_or("none", EncryptorId::name)
}

fn select_compressor(raw: &[u8], opts: &FreezeOptions) -> Option<Arc<dyn Compressor>> {
    match &opts.compressor {
        CompressorChoice::Off => None,
        CompressorChoice::Use(c) => Some(Arc::clone(c)),
        CompressorChoice::Choose(pick) => pick(raw),
        CompressorChoice::Auto => {
            // Headerless streams cannot signal whether they compressed,
            // so auto pins LZ4 and the reader assumes the same.
            if opts.no_header {
                return Some(Arc::new(Lz4));
            }
            if let Some(hook) = auto_compressor() {
                return hook(raw);
            }
            if raw.len() > AUTO_COMPRESS_MIN {
                Some(Arc::new(Lz4))
            } else {
                None
            }
        }
    }
}

fn select_encryptor(opts: &FreezeOptions) -> Option<(Arc<dyn Encryptor>, &[u8])> {
    let password = opts.password.as_deref()?;
    match &opts.encryptor {
        EncryptorChoice::Off => None,
        EncryptorChoice::Auto => Some((Arc::new(Aes128Sha512), password)),
        EncryptorChoice::Use(e) => Some((Arc::clone(e), password)),
    }
}

fn resolve_compressor(
    declared: Option<CompressorId>,
    choice: &CompressorChoice,
) -> Result<Option<Arc<dyn Compressor>>> {
    match declared {
        None => Ok(None),
        Some(CompressorId::Custom) => match choice {
            CompressorChoice::Use(c) => Ok(Some(Arc::clone(c))),
            _ => Err(Error::MissingCompressor),
        },
        Some(id) => match choice {
            CompressorChoice::Use(c) => Ok(Some(Arc::clone(c))),
            CompressorChoice::Off => Ok(None),
            CompressorChoice::Auto | CompressorChoice::Choose(_) => Ok(compress::standard(id)),
        },
    }
}

fn resolve_encryptor<'a>(
    declared: Option<EncryptorId>,
    opts: &'a ThawOptions,
) -> Result<Option<(Arc<dyn Encryptor>, &'a [u8])>> {
    let Some(id) = declared else {
        return Ok(None);
    };
    let encryptor = match (&opts.encryptor, id) {
        (EncryptorChoice::Use(e), _) => Arc::clone(e),
        (_, EncryptorId::Custom) => return Err(Error::MissingEncryptor),
        (_, EncryptorId::Aes128Sha512) => {
            crypto::standard(id).ok_or(Error::MissingEncryptor)?
        }
    };
    let password = opts
        .password
        .as_deref()
        .ok_or(Error::PasswordRequired { encryptor: id.name() })?;
    Ok(Some((encryptor, password)))
}

fn thaw_headered(
    ctx: &CodecContext,
    payload: &[u8],
    h: Header,
    opts: &ThawOptions,
) -> Result<Value> {
    let compressor = resolve_compressor(h.compressor, &opts.compressor)?;
    let encryptor = resolve_encryptor(h.encryptor, opts)?;
    let comp_name = compressor_name(h.compressor);
    let enc_name = encryptor_name(h.encryptor);
    let v1 = opts.v1_compatibility;

    let decrypted;
    let mut data: &[u8] = payload;
    if let Some((enc, password)) = &encryptor {
        decrypted = enc
            .decrypt(password, data)
            .map_err(|e| Error::thaw_failed(comp_name, enc_name, v1, e))?;
        data = &decrypted;
    }

    let decompressed;
    if let Some(c) = &compressor {
        decompressed = c
            .decompress(data)
            .map_err(|e| Error::thaw_failed(comp_name, enc_name, v1, e))?;
        data = &decompressed;
    }

    decode(ctx, data).map_err(|e| Error::thaw_failed(comp_name, enc_name, v1, e))
}

fn thaw_headerless(ctx: &CodecContext, bytes: &[u8], opts: &ThawOptions) -> Result<Value> {
    let v1 = opts.v1_compatibility;
    let encryptor: Option<(Arc<dyn Encryptor>, &[u8])> =
        match (&opts.encryptor, opts.password.as_deref()) {
            (_, None) | (EncryptorChoice::Off, _) => None,
            (EncryptorChoice::Auto, Some(password)) => {
                Some((Arc::new(Aes128Sha512), password))
            }
            (EncryptorChoice::Use(e), Some(password)) => Some((Arc::clone(e), password)),
        };
    let enc_name = encryptor.as_ref().map_or("none", |(e, _)| e.id().name());

    let decrypted;
    let mut data: &[u8] = bytes;
    if let Some((enc, password)) = &encryptor {
        decrypted = enc
            .decrypt(password, data)
            .map_err(|e| Error::thaw_failed("none", enc_name, v1, e))?;
        data = &decrypted;
    }

    // Headerless payloads cannot declare their compressor. An explicit
    // choice is final; otherwise mirror the freeze-side auto pin of LZ4
    // (LZ4 first, then raw), or the legacy Snappy-then-raw heuristic
    // under v1 compatibility.
    let attempts: Vec<Option<Arc<dyn Compressor>>> = match &opts.compressor {
        CompressorChoice::Use(c) => vec![Some(Arc::clone(c))],
        CompressorChoice::Off => vec![None],
        CompressorChoice::Auto | CompressorChoice::Choose(_) => {
            if v1 {
                debug!("v1 compatibility: trying the Snappy-then-raw legacy heuristic");
                vec![Some(Arc::new(Snappy) as Arc<dyn Compressor>), None]
            } else {
                vec![Some(Arc::new(Lz4) as Arc<dyn Compressor>), None]
            }
        }
    };

    let mut last_err = None;
    for attempt in attempts {
        let comp_name = attempt.as_ref().map_or("none", |c| c.id().name());
        let decompressed;
        let payload: &[u8] = match &attempt {
            Some(c) => match c.decompress(data) {
                Ok(out) => {
                    decompressed = out;
                    &decompressed
                }
                Err(e) => {
                    last_err = Some(Error::thaw_failed(comp_name, enc_name, v1, e));
                    continue;
                }
            },
            None => data,
        };
        match decode(ctx, payload) {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_err = Some(Error::thaw_failed(comp_name, enc_name, v1, e));
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        Error::thaw_failed(
            "none",
            enc_name,
            v1,
            ThawError::Truncated { needed: 1, remaining: 0 },
        )
    }))
}

// A framed payload is exactly one value; leftover bytes mean the wrong
// compressor was assumed or the stream is damaged, never a success.
fn decode(ctx: &CodecContext, data: &[u8]) -> std::result::Result<Value, ThawError> {
    let mut input = ByteReader::new(data);
    let value = thaw_value(&mut input, ctx)?;
    if input.is_empty() {
        Ok(value)
    } else {
        Err(ThawError::Malformed { what: "trailing bytes after the value" })
    }
}
