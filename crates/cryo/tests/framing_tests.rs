//! Framing pipeline tests: headers, compression, encryption, legacy
//! compatibility, diagnostics.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use cryo::compress::{Lz4, Lzma2, Snappy};
use cryo::{
    freeze, inspect, thaw, Compressor, CompressorChoice, CompressorId, Encoder, Encryptor,
    EncryptorChoice, EncryptorId, Error, FreezeOptions, Keyword, ThawOptions, Value,
};

fn sample_value() -> Value {
    let mut m = BTreeMap::new();
    m.insert(Value::from(Keyword::new("id")), Value::from(42i64));
    m.insert(
        Value::from(Keyword::new("tags")),
        Value::Vector(vec![Value::from("alpha"), Value::from("beta")]),
    );
    m.insert(Value::from(Keyword::new("blob")), Value::Bytes(vec![7u8; 12_000]));
    Value::Map(m)
}

#[test]
fn headered_and_headerless_round_trips() {
    let value = sample_value();

    let headered = freeze(&value, &FreezeOptions::new()).unwrap();
    assert_eq!(thaw(&headered, &ThawOptions::new()).unwrap(), value);

    let bare = freeze(&value, &FreezeOptions::new().no_header()).unwrap();
    assert_ne!(&bare[..3], b"NPY");
    assert_eq!(thaw(&bare, &ThawOptions::new().no_header()).unwrap(), value);
}

#[test]
fn headerless_auto_round_trips_small_values() {
    // Headerless auto always LZ4s on freeze; the thaw side must try LZ4
    // first, or a raw misread of the block's size prefix (here: 6, which
    // aliases the long-zero tag) could return the wrong value.
    let value = Value::from("hello");
    let bytes = freeze(&value, &FreezeOptions::new().no_header()).unwrap();
    assert_eq!(thaw(&bytes, &ThawOptions::new().no_header()).unwrap(), value);

    let zero = Value::from(0i64);
    let bytes = freeze(&zero, &FreezeOptions::new().no_header()).unwrap();
    assert_eq!(thaw(&bytes, &ThawOptions::new().no_header()).unwrap(), zero);
}

#[test]
fn trailing_bytes_after_the_value_are_rejected() {
    let mut bytes = freeze(&Value::from(1i64), &FreezeOptions::new()).unwrap();
    bytes.push(0x00);
    let err = thaw(&bytes, &ThawOptions::new()).unwrap_err();
    assert!(matches!(err, Error::ThawFailed { .. }));
}

#[test]
fn every_standard_compressor_is_transparent() {
    let value = sample_value();
    for (compressor, meta) in [
        (Arc::new(Snappy) as Arc<dyn Compressor>, 1u8),
        (Arc::new(Lz4), 8),
        (Arc::new(Lzma2), 11),
    ] {
        let opts = FreezeOptions::new().compressor(CompressorChoice::Use(compressor));
        let bytes = freeze(&value, &opts).unwrap();
        assert_eq!(bytes[3], meta);
        // The header carries the id; thaw needs no options.
        assert_eq!(thaw(&bytes, &ThawOptions::new()).unwrap(), value);
    }
}

#[test]
fn compressor_selection_hook_sees_the_raw_body() {
    let value = sample_value();
    let opts = FreezeOptions::new().compressor(CompressorChoice::Choose(Arc::new(|raw| {
        (raw.len() > 64).then(|| Arc::new(Snappy) as Arc<dyn Compressor>)
    })));
    let bytes = freeze(&value, &opts).unwrap();
    assert_eq!(bytes[3], 1);
    assert_eq!(thaw(&bytes, &ThawOptions::new()).unwrap(), value);
}

#[test]
fn small_bodies_skip_auto_compression() {
    let bytes = freeze(&Value::from(1i64), &FreezeOptions::new()).unwrap();
    assert_eq!(bytes[3], 0);
}

#[test]
fn encrypted_round_trip_authenticates() {
    let value = sample_value();
    let bytes = freeze(&value, &FreezeOptions::new().password("hunter2")).unwrap();
    // Large enough to compress, so both pipeline stages are in force.
    assert_eq!(bytes[3], 9); // lz4 + aes128-sha512

    assert_eq!(
        thaw(&bytes, &ThawOptions::new().password("hunter2")).unwrap(),
        value
    );
    let err = thaw(&bytes, &ThawOptions::new().password("hunter3")).unwrap_err();
    assert!(matches!(err, Error::ThawFailed { encryptor: "aes128-sha512", .. }));
}

#[test]
fn missing_password_is_reported_before_decoding() {
    let bytes = freeze(&Value::from("x"), &FreezeOptions::new().password("pw")).unwrap();
    let err = thaw(&bytes, &ThawOptions::new()).unwrap_err();
    assert!(matches!(err, Error::PasswordRequired { encryptor: "aes128-sha512" }));
}

#[test]
fn tampered_compressed_payload_reports_breadcrumbs() {
    let value = Value::Bytes(vec![9u8; 20_000]);
    let mut bytes = freeze(&value, &FreezeOptions::new()).unwrap();
    assert_eq!(bytes[3], 8);
    let mid = 4 + (bytes.len() - 4) / 2;
    bytes[mid] ^= 0xFF;
    match thaw(&bytes, &ThawOptions::new()) {
        // Depending on where the flip lands, LZ4 rejects the stream or the
        // decoder rejects the output; both must carry the compressor id.
        Err(Error::ThawFailed { compressor, .. }) => assert_eq!(compressor, "lz4"),
        Ok(v) => assert_ne!(v, value, "corruption went unnoticed"),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_tag_fails_without_panicking() {
    let err = thaw(&[0x00], &ThawOptions::new()).unwrap_err();
    assert!(matches!(err, Error::ThawFailed { .. }));
}

#[test]
fn unrecognized_header_meta_is_its_own_error() {
    let mut bytes = b"NPY".to_vec();
    bytes.push(0x63);
    bytes.extend_from_slice(&[1, 2, 3]);
    let err = thaw(&bytes, &ThawOptions::new()).unwrap_err();
    assert!(matches!(err, Error::UnrecognizedHeader { meta: 0x63 }));

    // v1 compatibility downgrades it to the legacy headerless attempt,
    // which then fails on the garbage payload.
    let err = thaw(&bytes, &ThawOptions::new().v1_compatibility()).unwrap_err();
    assert!(matches!(err, Error::ThawFailed { v1_compat: true, .. }));
}

#[test]
fn v1_snappy_payloads_thaw_with_the_legacy_flag() {
    let body = Value::from("legacy data").encode().unwrap();
    let packed = Snappy.compress(&body).unwrap();

    // Without the flag the headerless attempts are lz4-then-raw.
    assert!(thaw(&packed, &ThawOptions::new()).is_err());

    let value = thaw(&packed, &ThawOptions::new().v1_compatibility()).unwrap();
    assert_eq!(value, Value::from("legacy data"));

    // Uncompressed v1 payloads ride the "then none" half of the heuristic.
    let value = thaw(&body, &ThawOptions::new().v1_compatibility()).unwrap();
    assert_eq!(value, Value::from("legacy data"));
}

/// Reversible toy transform standing in for an out-of-tree compressor.
#[derive(Debug, Clone, Copy)]
struct Rot13;

impl Compressor for Rot13 {
    fn id(&self) -> CompressorId {
        CompressorId::Custom
    }
    fn compress(&self, raw: &[u8]) -> cryo::Result<Vec<u8>> {
        Ok(raw.iter().map(|b| b.wrapping_add(13)).collect())
    }
    fn decompress(&self, data: &[u8]) -> cryo::Result<Vec<u8>> {
        Ok(data.iter().map(|b| b.wrapping_sub(13)).collect())
    }
}

#[test]
fn custom_compressor_requires_an_out_of_band_instance() {
    let value = sample_value();
    let opts = FreezeOptions::new().compressor(CompressorChoice::Use(Arc::new(Rot13)));
    let bytes = freeze(&value, &opts).unwrap();
    assert_eq!(bytes[3], 5); // custom compressor, no encryption

    // The header can only say "custom"; resolution is the caller's job.
    let err = thaw(&bytes, &ThawOptions::new()).unwrap_err();
    assert!(matches!(err, Error::MissingCompressor));

    let opts = ThawOptions::new().compressor(CompressorChoice::Use(Arc::new(Rot13)));
    assert_eq!(thaw(&bytes, &opts).unwrap(), value);
}

/// Toy XOR "encryptor" standing in for an out-of-tree implementation.
#[derive(Debug, Clone, Copy)]
struct XorMask;

impl Encryptor for XorMask {
    fn id(&self) -> EncryptorId {
        EncryptorId::Custom
    }
    fn encrypt(&self, password: &[u8], plaintext: &[u8]) -> cryo::Result<Vec<u8>> {
        Ok(plaintext
            .iter()
            .zip(password.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect())
    }
    fn decrypt(&self, password: &[u8], ciphertext: &[u8]) -> cryo::Result<Vec<u8>> {
        self.encrypt(password, ciphertext)
    }
}

#[test]
fn custom_encryptor_requires_an_out_of_band_instance() {
    let value = Value::from("classified");
    let opts = FreezeOptions::new()
        .encryptor(EncryptorChoice::Use(Arc::new(XorMask)))
        .password("k");
    let bytes = freeze(&value, &opts).unwrap();
    assert_eq!(bytes[3], 4); // no compression, custom encryptor

    let err = thaw(&bytes, &ThawOptions::new().password("k")).unwrap_err();
    assert!(matches!(err, Error::MissingEncryptor));

    let opts = ThawOptions::new().encryptor(EncryptorChoice::Use(Arc::new(XorMask)));
    let err = thaw(&bytes, &opts.clone()).unwrap_err();
    assert!(matches!(err, Error::PasswordRequired { encryptor: "custom" }));

    assert_eq!(thaw(&bytes, &opts.password("k")).unwrap(), value);
}

#[test]
fn rich_value_round_trips_through_the_full_pipeline() {
    use num_bigint::BigInt;

    let mut m = BTreeMap::new();
    m.insert(
        Value::from(Keyword::namespaced("acct", "id")),
        Value::from(uuid::Uuid::from_u128(0xDEAD_BEEF_0000_0000_0000_0000_0000_0001)),
    );
    m.insert(
        Value::from(Keyword::new("balance")),
        Value::BigInt(BigInt::parse_bytes(b"340282366920938463463374607431768211456", 10).unwrap()),
    );
    m.insert(Value::from(Keyword::new("opened")), Value::Date(1_577_836_800_000));
    m.insert(Value::from(Keyword::new("grade")), Value::Char('A'));
    let value = Value::Map(m);

    let bytes = freeze(&value, &FreezeOptions::new().password("vault")).unwrap();
    assert_eq!(thaw(&bytes, &ThawOptions::new().password("vault")).unwrap(), value);
}

#[test]
fn custom_compressor_with_standard_encryptor_cannot_be_headered() {
    let opts = FreezeOptions::new()
        .compressor(CompressorChoice::Use(Arc::new(Rot13)))
        .password("pw");
    let err = freeze(&sample_value(), &opts).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedHeaderCombination { compressor: "custom", encryptor: "aes128-sha512" }
    ));

    // Headerless framing carries no id table, so the pair is fine there.
    let opts = FreezeOptions::new()
        .compressor(CompressorChoice::Use(Arc::new(Rot13)))
        .password("pw")
        .no_header();
    let bytes = freeze(&sample_value(), &opts).unwrap();
    let opts = ThawOptions::new()
        .compressor(CompressorChoice::Use(Arc::new(Rot13)))
        .password("pw")
        .no_header();
    assert_eq!(thaw(&bytes, &opts).unwrap(), sample_value());
}

#[test]
fn inspect_reports_header_geometry_and_thawability() {
    let bytes = freeze(&Value::from("hello"), &FreezeOptions::new()).unwrap();
    let report = inspect(&bytes, &ThawOptions::new());
    assert_eq!(report.len, bytes.len());
    let header = report.header.unwrap();
    assert_eq!(header.meta, 0);
    assert_eq!(header.compressor, "none");
    assert_eq!(header.encryptor, "none");
    assert_eq!(report.payload_offset, 4);
    assert_eq!(report.payload_len, bytes.len() - 4);
    assert!(report.thaws);
    assert!(!report.nested_frozen);
}

#[test]
fn inspect_flags_encrypted_streams_it_cannot_open() {
    let bytes = freeze(&Value::from("x"), &FreezeOptions::new().password("pw")).unwrap();
    let report = inspect(&bytes, &ThawOptions::new());
    assert_eq!(report.header.unwrap().encryptor, "aes128-sha512");
    assert!(!report.thaws);
}

#[test]
fn inspect_surfaces_unknown_meta_and_nesting() {
    let report = inspect(b"NPY\x63rest", &ThawOptions::new());
    assert_eq!(report.unrecognized_meta, Some(0x63));
    assert!(report.header.is_none());
    assert!(!report.thaws);

    let mut doubled = b"NPY\x00".to_vec();
    doubled.extend_from_slice(b"NPY\x00\x01");
    let report = inspect(&doubled, &ThawOptions::new());
    assert!(report.nested_frozen);
    assert!(!report.thaws);
}
