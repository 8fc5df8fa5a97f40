//! Object storage key generation for new uploads

use chrono::Utc;
use rand::Rng;

/// Prefix shared by every upload key
pub const UPLOAD_KEY_PREFIX: &str = "uploads/";

/// Extension used when the filename does not provide one
pub const DEFAULT_EXTENSION: &str = "bin";

/// Length of the random part of the key
pub const RANDOM_SUFFIX_LEN: usize = 8;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new object key of the form `uploads/<unix-ms>-<suffix>.<ext>`
///
/// The extension is taken from `filename` (see [`file_extension`]). Keys are
/// unique with overwhelming probability but not guaranteed: two calls within
/// the same millisecond collide with probability 36^-8.
#[must_use]
pub fn generate_upload_key(filename: Option<&str>) -> String {
    let suffix = random_suffix(&mut rand::thread_rng());
    format_key(Utc::now().timestamp_millis(), &suffix, &file_extension(filename))
}

/// Lower-cased extension of the last path segment of `filename`
///
/// Falls back to [`DEFAULT_EXTENSION`] when there is no filename, no dot or
/// nothing after the last dot.
#[must_use]
pub fn file_extension(filename: Option<&str>) -> String {
    filename
        .map(|name| name.rsplit('/').next().unwrap_or(name))
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Draws [`RANDOM_SUFFIX_LEN`] characters from `[a-z0-9]`
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect()
}

/// Assembles a key from its parts
#[must_use]
pub fn format_key(timestamp_ms: i64, suffix: &str, extension: &str) -> String {
    format!("{UPLOAD_KEY_PREFIX}{timestamp_ms}-{suffix}.{extension}")
}
