//! Trial-counter encoding for the mining search.
//!
//! Nonce candidates are not random: they are the non-negative integers
//! 0, 1, 2, ... written in base 94 over the printable ASCII alphabet
//! (code points 33..=126, ordered by code point). Because every
//! implementation enumerates trials in the same order, two independent
//! miners given the same block inputs discover the same nonce.

/// Lowest symbol of the nonce alphabet (`'!'`).
const ALPHABET_START: u8 = 33;

/// Highest symbol of the nonce alphabet (`'~'`).
const ALPHABET_END: u8 = 126;

/// Number of symbols in the nonce alphabet.
const BASE: u64 = (ALPHABET_END - ALPHABET_START + 1) as u64;

/// Encodes a trial counter as a nonce string.
///
/// `encode(0)` is `"!"`; larger counters are the standard base-94
/// positional conversion, most-significant digit first.
///
/// # Arguments
///
/// * `trial` - The trial counter to encode
///
/// # Returns
///
/// The nonce string for this trial
pub fn encode(mut trial: u64) -> String {
    if trial == 0 {
        return "!".to_string();
    }

    let mut digits = Vec::new();
    while trial > 0 {
        digits.push(ALPHABET_START + (trial % BASE) as u8);
        trial /= BASE;
    }

    digits.iter().rev().map(|&b| b as char).collect()
}

/// Decodes a nonce string back to its trial counter.
///
/// # Arguments
///
/// * `nonce` - The nonce string to decode
///
/// # Returns
///
/// The trial counter, or `None` if the string is empty or contains a
/// symbol outside the alphabet
pub fn decode(nonce: &str) -> Option<u64> {
    if nonce.is_empty() {
        return None;
    }

    let mut value: u64 = 0;
    for byte in nonce.bytes() {
        if !(ALPHABET_START..=ALPHABET_END).contains(&byte) {
            return None;
        }
        value = value
            .checked_mul(BASE)?
            .checked_add((byte - ALPHABET_START) as u64)?;
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encode_zero() {
        assert_eq!(encode(0), "!");
    }

    #[test]
    fn test_encode_single_digits() {
        assert_eq!(encode(1), "\"");
        assert_eq!(encode(93), "~");
    }

    #[test]
    fn test_encode_multi_digit() {
        // 94 = 1 * 94 + 0 -> digits [1, 0]
        assert_eq!(encode(94), "\"!");
        assert_eq!(encode(95), "\"\"");
        assert_eq!(encode(2 * 94), "#!");
        // 94^2 -> digits [1, 0, 0]
        assert_eq!(encode(94 * 94), "\"!!");
    }

    #[test]
    fn test_encode_is_injective() {
        let mut seen = HashSet::new();
        for trial in 0..100_000u64 {
            assert!(seen.insert(encode(trial)), "duplicate nonce at {}", trial);
        }
    }

    #[test]
    fn test_decode_inverts_encode() {
        for trial in (0..500_000u64).step_by(97) {
            assert_eq!(decode(&encode(trial)), Some(trial));
        }
        assert_eq!(decode(&encode(u64::MAX)), Some(u64::MAX));
    }

    #[test]
    fn test_decode_rejects_invalid_input() {
        assert_eq!(decode(""), None);
        assert_eq!(decode(" "), None);
        assert_eq!(decode("a b"), None);
        assert_eq!(decode("\u{00e9}"), None);
    }
}
