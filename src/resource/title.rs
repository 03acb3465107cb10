//! Generated titles for books declared without one
//!
//! Pure local randomness: the value is produced before the request payload
//! is built and never requires a round trip.

use rand::Rng;

pub const GENERATED_TITLE_PREFIX: &str = "generated.title.";

pub const GENERATED_SUFFIX_LEN: usize = 16;

/// Letters and digits without the look-alikes `0 O o 1 l I`
pub const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

/// Generate a fresh title from the thread-local RNG
pub fn generate_title() -> String {
    generate_title_with(&mut rand::thread_rng())
}

pub fn generate_title_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..GENERATED_SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", GENERATED_TITLE_PREFIX, suffix)
}

/// Whether `title` has the shape of a generated title
pub fn is_generated_title(title: &str) -> bool {
    match title.strip_prefix(GENERATED_TITLE_PREFIX) {
        Some(suffix) => {
            suffix.len() == GENERATED_SUFFIX_LEN
                && suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b))
        }
        None => false,
    }
}
