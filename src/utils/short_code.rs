//! Short code alphabet, random generation, validation and base-62 codec.
//!
//! Codes are drawn from a fixed 62-symbol alphabet (digits, lowercase,
//! uppercase). Generation samples each symbol independently and uniformly
//! from OS entropy; uniqueness is left to the store.

/// The 62-symbol alphabet, in codec order.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Shortest code accepted on the lookup path.
pub const MIN_CODE_LENGTH: usize = 1;

/// Longest code accepted on the lookup path.
pub const MAX_CODE_LENGTH: usize = 10;

/// Codes shadowed by fixed top-level routes; a link stored under one of
/// these would never be reached through `/{code}`.
pub const RESERVED_CODES: &[&str] = &["api", "health"];

const BASE: u64 = ALPHABET.len() as u64;

/// The operating system entropy source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("entropy source unavailable: {0}")]
pub struct EntropyError(pub String);

/// Failure decoding a base-62 string.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Base62Error {
    #[error("empty input")]
    Empty,
    #[error("invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Uniform sampling primitive backed by a secure random source.
pub trait SecureRandom: Send + Sync {
    /// Returns an index uniformly distributed in `0..bound`.
    ///
    /// `bound` must be in `1..=256`.
    fn sample(&self, bound: usize) -> Result<usize, EntropyError>;
}

/// [`SecureRandom`] reading from the operating system via `getrandom`.
///
/// Uses rejection sampling over single bytes: bytes at or above the largest
/// multiple of `bound` are discarded, so every index is equally likely.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn sample(&self, bound: usize) -> Result<usize, EntropyError> {
        debug_assert!((1..=256).contains(&bound));

        let zone = 256 - (256 % bound);
        let mut buf = [0u8; 16];

        loop {
            getrandom::fill(&mut buf).map_err(|e| EntropyError(e.to_string()))?;

            if let Some(&byte) = buf.iter().find(|&&b| (b as usize) < zone) {
                return Ok(byte as usize % bound);
            }
        }
    }
}

/// Generates a random code of `length` symbols.
///
/// A zero `length` falls back to [`DEFAULT_CODE_LENGTH`].
///
/// # Errors
///
/// Returns [`EntropyError`] if the random source fails.
pub fn generate_code(rng: &dyn SecureRandom, length: usize) -> Result<String, EntropyError> {
    let length = if length == 0 {
        DEFAULT_CODE_LENGTH
    } else {
        length
    };

    let mut code = String::with_capacity(length);
    for _ in 0..length {
        let index = rng.sample(ALPHABET.len())?;
        code.push(ALPHABET[index] as char);
    }

    Ok(code)
}

/// Returns `true` if `c` belongs to the code alphabet.
pub fn is_alphabet_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Checks that `code` could be a short code: length within
/// [`MIN_CODE_LENGTH`]..=[`MAX_CODE_LENGTH`] and alphabet-only.
///
/// Run before any store access on the redirect path.
pub fn validate_code_format(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len()) && code.chars().all(is_alphabet_char)
}

/// Returns `true` if `code` collides with a fixed route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Encodes a number as base-62. Zero encodes as `"0"`.
pub fn encode_base62(mut num: u64) -> String {
    if num == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::new();
    while num > 0 {
        digits.push(ALPHABET[(num % BASE) as usize]);
        num /= BASE;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Decodes a base-62 string produced by [`encode_base62`].
///
/// # Errors
///
/// Fails on empty input, on any character outside the alphabet and on values
/// that overflow `u64`.
pub fn decode_base62(input: &str) -> Result<u64, Base62Error> {
    if input.is_empty() {
        return Err(Base62Error::Empty);
    }

    input.chars().enumerate().try_fold(0u64, |acc, (position, c)| {
        let value = symbol_value(c).ok_or(Base62Error::InvalidCharacter {
            character: c,
            position,
        })?;

        acc.checked_mul(BASE)
            .and_then(|n| n.checked_add(value))
            .ok_or(Base62Error::Overflow)
    })
}

fn symbol_value(c: char) -> Option<u64> {
    let value = match c {
        '0'..='9' => c as u64 - '0' as u64,
        'a'..='z' => c as u64 - 'a' as u64 + 10,
        'A'..='Z' => c as u64 - 'A' as u64 + 36,
        _ => return None,
    };
    Some(value)
}
