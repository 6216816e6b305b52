//! Descriptive item id generation.
//!
//! An id is `<slug>_<suffix>`: the slug is the item text with whitespace
//! replaced by `_` (for readability only), the suffix is 5 random chars from
//! a 62-symbol alphabet and is what actually disambiguates ids.
//!
//! # Invariants
//! - Generation is stateless; randomness comes from the thread-local RNG, so
//!   concurrent callers never coordinate.
//! - Empty and repeated texts are accepted.

use crate::model::item::ItemId;
use rand::Rng;

pub const SUFFIX_LEN: usize = 5;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates an id for an item holding `text`.
pub fn generate_item_id(text: &str) -> ItemId {
    generate_item_id_with(&mut rand::thread_rng(), text)
}

/// Same as [`generate_item_id`] with a caller-provided RNG.
pub fn generate_item_id_with<R: Rng + ?Sized>(rng: &mut R, text: &str) -> ItemId {
    let suffix = (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect::<String>();
    format!("{}_{suffix}", slugify(text))
}

/// Replaces every whitespace char with `_`.
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .collect()
}
