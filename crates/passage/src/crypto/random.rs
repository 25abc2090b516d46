// Random token generation.

use rand::Rng;

/// URL-safe token alphabet: a-z, A-Z, 0-9, -, _ (64 characters).
const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

/// Generate a random token of `length` characters from [`TOKEN_CHARS`].
///
/// 64 symbols per character gives 6 bits of entropy each; the 32-character
/// tokens used for email verification carry 192 bits.
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| TOKEN_CHARS[rng.gen_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}
