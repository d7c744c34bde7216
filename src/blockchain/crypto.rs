use sha2::{Digest, Sha256};

/// Computes the digest of a string as used for both mining and validation.
///
/// The same function must be applied on both sides: a chain sealed with one
/// digest only validates under that digest.
///
/// # Arguments
///
/// * `input` - The canonical string to hash
///
/// # Returns
///
/// The SHA-256 hash of the UTF-8 bytes of `input` as a lowercase
/// hexadecimal string
pub fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
