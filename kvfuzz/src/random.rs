use rand::{Rng, distr::Alphanumeric};

/// Builds a string of `length` characters drawn from `[A-Za-z0-9]`.
///
/// Nothing prevents two calls from producing the same string.
pub fn alphanumeric<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
