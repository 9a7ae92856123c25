use std::time::Duration;

use url::Url;

use crate::employee::Endpoints;
use crate::error::{Error, Result};
use crate::request::{Given, DEFAULT_TIMEOUT};

pub const DEFAULT_BASE_URL: &str = "https://dummy.restapiexample.com/api";
pub const BASE_URL_VAR: &str = "EMPLOYEE_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "EMPLOYEE_API_TIMEOUT_MS";

/// Where the suite points and how long each request may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset or
    /// blank keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = Url::parse(base_url.trim())
                .map_err(|e| Error::Config(format!("{BASE_URL_VAR}=`{base_url}`: {e}")))?;
        }

        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            let millis: u64 = timeout
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{TIMEOUT_VAR}=`{timeout}`: {e}")))?;
            if millis == 0 {
                return Err(Error::Config(format!("{TIMEOUT_VAR} must be greater than zero")));
            }
            config.timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.base_url)
    }

    /// The preamble every case shares: a name, the suite timeout and a JSON
    /// content type.
    pub fn given(&self, name: impl Into<String>) -> Given {
        Given::new()
            .name(name)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
    }
}
