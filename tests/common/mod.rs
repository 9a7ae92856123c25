//! Shared setup for the live-service suites. These tests talk to the real
//! Employee service and are ignored by default; run them with
//! `cargo test -- --ignored`.

#![allow(dead_code)]

use employee_api_tester::employee::{random_letters, MAX_FIELD_LEN};
use employee_api_tester::{init_logging, Config, Result};

pub const NOT_FOUND_MESSAGE: &str = "Error Occured! Page Not found, contact rstapi2example@gmail.com";

/// Placeholder in case tables for a field longer than the service allows.
pub const OVER_MAX: &str = ">max";

pub fn config() -> Config {
    init_logging();
    Config::from_env().expect("suite configuration")
}

/// Swaps the [`OVER_MAX`] placeholder for a random over-length value.
pub fn expand(value: &str) -> String {
    if value == OVER_MAX {
        random_letters(MAX_FIELD_LEN + 1)
    } else {
        value.to_string()
    }
}

/// Collects case failures so one bad case does not hide the rest.
#[derive(Debug, Default)]
pub struct Failures(Vec<String>);

impl Failures {
    pub fn record(&mut self, case: &str, result: Result<()>) {
        if let Err(err) = result {
            self.0.push(format!("{case}: {err}"));
        }
    }

    pub fn check(self) {
        assert!(
            self.0.is_empty(),
            "{} case(s) failed:\n{}",
            self.0.len(),
            self.0.join("\n")
        );
    }
}
