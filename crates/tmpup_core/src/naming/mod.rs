//! Record identifier generation.

use crate::constants::ID_LEN;
use rand::Rng;

/// Characters identifiers are drawn from.
pub const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh record identifier.
///
/// The identifier is [`ID_LEN`] characters drawn uniformly from
/// [`ID_CHARSET`] with the thread-local RNG. Uniqueness is not checked
/// against stored rows; a collision surfaces as a primary-key failure on save.
///
/// # Returns
/// A lowercase alphanumeric identifier.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Whether `value` has the shape of an identifier produced by [`generate_id`].
pub fn is_valid_id(value: &str) -> bool {
    value.len() == ID_LEN && value.bytes().all(|b| ID_CHARSET.contains(&b))
}
