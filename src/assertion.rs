//! Deferred, batched assertions over a captured response.

use std::fmt;

use assert_json_diff::{assert_json_matches_no_panic, CompareMode, Config};
use serde_json::Value;

use crate::error::Result;
use crate::request::RequestSpec;
use crate::response::Response;

type Outcome = std::result::Result<(), String>;
type Predicate = Box<dyn Fn(&Response) -> Outcome + Send + Sync>;

/// Which part of the response an entry looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Status,
    Body,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Status => write!(f, "status"),
            Check::Body => write!(f, "body"),
        }
    }
}

/// A labelled predicate, evaluated only when [`Then::assert_all`] runs.
pub struct AssertionEntry {
    label: String,
    check: Check,
    predicate: Predicate,
}

impl AssertionEntry {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self) -> Check {
        self.check
    }

    fn evaluate(&self, response: &Response) -> Option<AssertionFailure> {
        (self.predicate)(response).err().map(|actual| AssertionFailure {
            label: self.label.clone(),
            check: self.check,
            actual,
        })
    }
}

impl fmt::Debug for AssertionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionEntry")
            .field("label", &self.label)
            .field("check", &self.check)
            .finish_non_exhaustive()
    }
}

/// One predicate that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub label: String,
    pub check: Check,
    pub actual: String,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.label, self.actual)
    }
}

/// Every failed assertion of one request, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct AssertionReport {
    pub name: String,
    pub failures: Vec<AssertionFailure>,
}

impl AssertionReport {
    pub fn labels(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.label.as_str()).collect()
    }
}

impl fmt::Display for AssertionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}`: {} assertion(s) failed",
            self.name,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

/// Third phase: a captured response plus the assertions registered against it.
#[derive(Debug)]
pub struct Then {
    spec: RequestSpec,
    response: Response,
    entries: Vec<AssertionEntry>,
}

impl Then {
    pub fn new(spec: RequestSpec, response: Response) -> Self {
        Self {
            spec,
            response,
            entries: Vec::new(),
        }
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn entries(&self) -> &[AssertionEntry] {
        &self.entries
    }

    /// Prints the raw exchange. Has no bearing on the outcome.
    pub fn debug(self) -> Self {
        let exchange = format!(
            "=== {} ===\n--- request ---\n{}\n--- response ---\n{}\n",
            self.spec.name(),
            self.spec.render(),
            self.response.render()
        );
        log::debug!("{exchange}");
        println!("{exchange}");
        self
    }

    pub fn test_status<F>(mut self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.entries.push(AssertionEntry {
            label: label.into(),
            check: Check::Status,
            predicate: Box::new(move |response| {
                if predicate(response.status_code()) {
                    Ok(())
                } else {
                    Err(format!("status was {}", response.status()))
                }
            }),
        });
        self
    }

    pub fn test_body<F>(mut self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.entries.push(AssertionEntry {
            label: label.into(),
            check: Check::Body,
            predicate: Box::new(move |response| {
                if predicate(response.body()) {
                    Ok(())
                } else {
                    Err(format!("body was {}", response.preview()))
                }
            }),
        });
        self
    }

    /// Checks that the body contains `expected`; extra fields in the body are
    /// allowed.
    pub fn test_body_matches(mut self, label: impl Into<String>, expected: Value) -> Self {
        self.entries.push(AssertionEntry {
            label: label.into(),
            check: Check::Body,
            predicate: Box::new(move |response| {
                let config = Config::new(CompareMode::Inclusive);
                assert_json_matches_no_panic(response.body(), &expected, config)
            }),
        });
        self
    }

    /// Pulls a value out of the body, e.g. the id of a freshly created record.
    pub fn retrieve<T>(&self, extract: impl FnOnce(&Value) -> T) -> T {
        extract(self.response.body())
    }

    /// JSON-pointer lookup into the body, e.g. `/data/id`.
    pub fn retrieve_pointer(&self, pointer: &str) -> Option<&Value> {
        self.response.body().pointer(pointer)
    }

    /// Evaluates every registered assertion in order and reports all failures
    /// together.
    pub fn assert_all(&self) -> Result<()> {
        let failures: Vec<_> = self
            .entries
            .iter()
            .filter_map(|entry| entry.evaluate(&self.response))
            .collect();

        if failures.is_empty() {
            log::info!(
                "`{}`: {} assertion(s) passed",
                self.spec.name(),
                self.entries.len()
            );
            return Ok(());
        }

        let report = AssertionReport {
            name: self.spec.name().to_string(),
            failures,
        };
        log::warn!("{report}");
        Err(report.into())
    }
}
