//! Black-box tests for the dummy "Employee" REST service, built on a small
//! request/assertion builder.
//!
//! A test case goes through three phases:
//!
//! ```no_run
//! # async fn case() -> employee_api_tester::Result<()> {
//! use employee_api_tester::Given;
//!
//! Given::new()
//!     .name("Get employees- Happy Path")
//!     .header("Content-Type", "application/json")
//!     .when()
//!     .get("https://dummy.restapiexample.com/api/v1/employees")
//!     .execute()
//!     .await?
//!     .debug()
//!     .test_status("response code", |code| code == 200)
//!     .test_body("response status", |body| body["status"] == "success")
//!     .assert_all()
//! # }
//! ```
//!
//! Assertions only exist on the executed phase, so checking a response that
//! was never fetched does not compile:
//!
//! ```compile_fail
//! use employee_api_tester::Given;
//!
//! Given::new()
//!     .when()
//!     .get("http://127.0.0.1/v1/employees")
//!     .test_status("response code", |code| code == 200);
//! ```

pub mod assertion;
pub mod config;
pub mod employee;
pub mod error;
pub mod poll;
pub mod request;
pub mod response;
pub mod stub;

pub use assertion::{AssertionEntry, AssertionFailure, AssertionReport, Check, Then};
pub use config::Config;
pub use employee::{EmployeeFixture, EmployeePayload, Endpoints};
pub use error::{Error, Result};
pub use poll::{until_rate_limited, until_status, Observed};
pub use request::{Given, Prepared, RequestSpec, When};
pub use response::Response;

/// Installs `pretty_env_logger` once; later calls are no-ops. Honors
/// `RUST_LOG`.
pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}
