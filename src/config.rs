use serde::Deserialize;

use crate::qrcode::{DEFAULT_CHART_BASE_URL, DEFAULT_CHART_SIZE};
use crate::secret::DEFAULT_SECRET_BYTES;

const ENV_PREFIX: &str = "OTPGEN_";

/// Settings read from `OTPGEN_*` environment variables. Command-line flags
/// override them.
#[derive(Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_secret_bytes")]
    pub secret_bytes: i64,
    #[serde(default)]
    pub issuer: Option<String>,
    /// Skips the hostname lookup when set.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_chart_base_url")]
    pub chart_base_url: String,
    #[serde(default = "default_chart_size")]
    pub chart_size: u32,
}

fn default_secret_bytes() -> i64 {
    DEFAULT_SECRET_BYTES
}

fn default_chart_base_url() -> String {
    DEFAULT_CHART_BASE_URL.to_string()
}

fn default_chart_size() -> u32 {
    DEFAULT_CHART_SIZE
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        Config::from_pairs(std::env::vars())
    }

    fn from_pairs<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(vars)
    }
}
