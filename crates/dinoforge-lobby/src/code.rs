//! Lobby codes and guest identities.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use dinoforge_protocol::PlayerId;
use rand::Rng;

/// Uppercase letters and digits without the easily confused `0 O 1 I`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a random lobby code of `len` characters.
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Derives a negative id for a player without an account.
///
/// Mixes the nickname with the current time so two guests with the same
/// nickname get different ids.
pub fn guest_id(nickname: &str) -> PlayerId {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = DefaultHasher::new();
    nickname.hash(&mut hasher);
    nanos.hash(&mut hasher);

    let magnitude = (hasher.finish() >> 1) as i64;
    PlayerId(-magnitude.max(1))
}

/// Returns `true` if `user_id` is absent or zero and needs a guest id.
pub fn needs_guest_id(user_id: Option<PlayerId>) -> bool {
    user_id.is_none_or(|id| id.0 == 0)
}
