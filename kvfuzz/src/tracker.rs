use std::collections::BTreeSet;

use rand::Rng;

/// The keys we believe exist on the remote service.
///
/// This is only a cache of what the server told us, used for picking targets. It can drift
/// from the real server state whenever a response is lost or ambiguous, until the next
/// successful listing replaces it.
// BTreeSet keeps iteration order stable, so a seeded RNG picks the same key every run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyTracker {
    keys: BTreeSet<String>,
}

impl KeyTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Uniformly picks one of the tracked keys, `None` if there are none.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let index = rng.random_range(0..self.keys.len());

        self.keys.iter().nth(index).map(String::as_str)
    }

    pub fn add(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.keys.remove(key);
    }

    pub fn replace_all<I>(&mut self, keys: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
