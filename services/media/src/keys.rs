//! Storage key generation
//!
//! Keys carry 32 bytes from the operating system's CSPRNG so object URLs can't
//! be enumerated. Uniqueness is not checked against the store; a collision is
//! treated as negligible.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Random bytes per key
pub const KEY_ENTROPY_BYTES: usize = 32;

/// Build `[<prefix>/]<random>.<extension>`
pub fn generate_key(prefix: Option<&str>, extension: &str) -> String {
    let mut bytes = [0u8; KEY_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let name = URL_SAFE_NO_PAD.encode(bytes);

    let extension = extension.trim_start_matches('.');
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}/{}.{}", prefix, name, extension),
        _ => format!("{}.{}", name, extension),
    }
}
