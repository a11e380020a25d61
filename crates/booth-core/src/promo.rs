//! Promo codes handed out on Loummel signup.
//!
//! Codes are random, not unique by construction: two signups can in
//! principle draw the same code. The email-uniqueness check on signup is the
//! real guard; the code is only a shareable token.

use rand::Rng;

pub const PROMO_PREFIX: &str = "LOUMMEL-";
pub const SUFFIX_LEN: usize = 6;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a promo code from the thread-local RNG.
pub fn generate() -> String { generate_with(&mut rand::thread_rng()) }

/// Generate a promo code from a caller-supplied RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
  let suffix: String = (0..SUFFIX_LEN)
    .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
    .collect();
  format!("{PROMO_PREFIX}{suffix}")
}
