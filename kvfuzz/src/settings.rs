use std::ops::RangeInclusive;

pub const BASE_URL: &str = "http://localhost:8081/api";
/// Once this many keys are tracked, every iteration deletes instead of picking at random.
pub const MAX_KEYS: usize = 10;
pub const PAUSE_SECONDS: RangeInclusive<u64> = 1..=5;
pub const KEY_LENGTH: usize = 8;
pub const VALUE_LENGTH: usize = 16;
/// Set to `None` to run with local logging only.
pub const OTLP_ENDPOINT: Option<&str> = Some("http://localhost:4317");

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub max_keys: usize,
    pub pause_seconds: RangeInclusive<u64>,
    pub key_length: usize,
    pub value_length: usize,
    pub otlp_endpoint: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            max_keys: MAX_KEYS,
            pause_seconds: PAUSE_SECONDS,
            key_length: KEY_LENGTH,
            value_length: VALUE_LENGTH,
            otlp_endpoint: OTLP_ENDPOINT.map(str::to_string),
        }
    }
}
