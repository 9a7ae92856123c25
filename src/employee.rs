//! The Employee service's endpoints, payloads and fixtures.

use http::StatusCode;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

pub const MAX_FIELD_LEN: usize = 255;

static NULL: Value = Value::Null;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Random ASCII letters, for over-length field cases.
pub fn random_letters(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}

/// URL builders for the five endpoints. Ids are taken as text so malformed
/// ids (`"s"`, `"#2012"`, `""`) can be sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base_url: &Url) -> Self {
        Self {
            base: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn create(&self) -> String {
        format!("{}/v1/create", self.base)
    }

    pub fn update(&self, id: &str) -> String {
        format!("{}/v1/update/{id}", self.base)
    }

    pub fn employee(&self, id: &str) -> String {
        format!("{}/v1/employee/{id}", self.base)
    }

    pub fn employees(&self) -> String {
        format!("{}/v1/employees", self.base)
    }

    pub fn delete(&self, id: &str) -> String {
        format!("{}/v1/delete/{id}", self.base)
    }
}

/// Create/update request body.
///
/// The serde mapping sends `name` under the wire key `"ame"`. That mapping is
/// almost certainly a typo but is kept as found: [`EmployeePayload::to_wire_json`]
/// reproduces it, [`EmployeePayload::to_intended_json`] sends `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayload {
    #[serde(rename = "ame")]
    pub name: String,
    pub salary: String,
    pub age: String,
}

impl EmployeePayload {
    pub fn new(name: impl Into<String>, salary: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            salary: salary.into(),
            age: age.into(),
        }
    }

    /// Encoding through the declared serde mapping (`"ame"` key).
    pub fn to_wire_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encoding with the `name` key the service documents.
    pub fn to_intended_json(&self) -> Result<String> {
        fields_json(Some(&self.name), Some(&self.salary), Some(&self.age), Absent::Omit)
    }
}

/// How [`fields_json`] renders a field given as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absent {
    /// Leave the key out.
    Omit,
    /// Send the key with `null`.
    Null,
}

/// Builds a `name`/`salary`/`age` object for the missing-field and null-field
/// cases. Keys keep the `name`, `salary`, `age` order.
pub fn fields_json(
    name: Option<&str>,
    salary: Option<&str>,
    age: Option<&str>,
    absent: Absent,
) -> Result<String> {
    Ok(serde_json::to_string(&fields(name, salary, age, absent))?)
}

pub fn fields(
    name: Option<&str>,
    salary: Option<&str>,
    age: Option<&str>,
    absent: Absent,
) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in [("name", name), ("salary", salary), ("age", age)] {
        match (value, absent) {
            (Some(value), _) => {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            (None, Absent::Null) => {
                map.insert(key.to_string(), Value::Null);
            }
            (None, Absent::Omit) => {}
        }
    }
    map
}

/// An employee created up front for cases that need an existing record.
/// Passed to each dependent case instead of living in shared state.
#[derive(Debug, Clone)]
pub struct EmployeeFixture {
    pub endpoints: Endpoints,
    pub id: String,
    pub payload: EmployeePayload,
}

impl EmployeeFixture {
    /// Creates the record and keeps its id. Fails unless the service answers
    /// with `expected` and a `data.id`.
    pub async fn create(config: &Config, payload: EmployeePayload, expected: StatusCode) -> Result<Self> {
        let endpoints = config.endpoints();
        let then = config
            .given(format!("fixture: create employee `{}`", payload.name))
            .body(payload.to_intended_json()?)
            .when()
            .post(endpoints.create())
            .execute()
            .await?
            .debug()
            .test_status("response code", move |code| code == expected.as_u16());
        then.assert_all()?;

        let id = then
            .retrieve(|body| id_text(&record(body)["id"]))
            .ok_or_else(|| {
                Error::Fixture(format!(
                    "no employee id in create response: {}",
                    then.response().raw()
                ))
            })?;

        log::info!("fixture employee `{}` created with id {id}", payload.name);
        Ok(Self {
            endpoints,
            id,
            payload,
        })
    }
}

/// The employee record in a response body. List-shaped endpoints wrap it in
/// a `data` array, single-record ones return `data` as the object itself.
pub fn record(body: &Value) -> &Value {
    match &body["data"] {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        data => data,
    }
}

/// Ids arrive as numbers from some endpoints and strings from others.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn random_letters_are_letters() {
        let text = random_letters(MAX_FIELD_LEN + 1);

        assert_eq!(text.len(), 256);
        assert!(text.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn endpoints_follow_the_service_layout() {
        let base = Url::parse("https://dummy.restapiexample.com/api/").unwrap();
        let endpoints = Endpoints::new(&base);

        assert_eq!(endpoints.create(), "https://dummy.restapiexample.com/api/v1/create");
        assert_eq!(endpoints.update("12"), "https://dummy.restapiexample.com/api/v1/update/12");
        assert_eq!(endpoints.employee("1"), "https://dummy.restapiexample.com/api/v1/employee/1");
        assert_eq!(endpoints.employees(), "https://dummy.restapiexample.com/api/v1/employees");
        assert_eq!(endpoints.delete(""), "https://dummy.restapiexample.com/api/v1/delete/");
    }

    #[test]
    fn declared_mapping_sends_ame() {
        let payload = EmployeePayload::new("testing", "100000", "20");

        let wire: Value = serde_json::from_str(&payload.to_wire_json().unwrap()).unwrap();
        assert_eq!(wire, json!({"ame": "testing", "salary": "100000", "age": "20"}));
        assert!(wire.get("name").is_none());
    }

    #[test]
    fn intended_encoding_sends_name() {
        let payload = EmployeePayload::new("testing", "100000", "20");

        assert_eq!(
            payload.to_intended_json().unwrap(),
            r#"{"name":"testing","salary":"100000","age":"20"}"#
        );
    }

    #[test]
    fn missing_fields_are_omitted_or_nulled() {
        let omitted = fields_json(Some("testing"), None, Some("20"), Absent::Omit).unwrap();
        assert_eq!(omitted, r#"{"name":"testing","age":"20"}"#);

        let nulled = fields(None, Some("100000"), Some("20"), Absent::Null);
        assert_eq!(
            Value::Object(nulled),
            json!({"name": null, "salary": "100000", "age": "20"})
        );
    }

    #[test]
    fn record_unwraps_array_and_object_data() {
        let listed = json!({"data": [{"id": 1}, {"id": 2}]});
        let single = json!({"data": {"id": 3}});

        assert_eq!(record(&listed)["id"], json!(1));
        assert_eq!(record(&single)["id"], json!(3));
        assert!(record(&json!({"data": []})).is_null());
        assert!(record(&Value::Null).is_null());
    }

    #[test]
    fn ids_may_be_numbers_or_strings() {
        assert_eq!(id_text(&json!(25)), Some("25".to_string()));
        assert_eq!(id_text(&json!("25")), Some("25".to_string()));
        assert_eq!(id_text(&json!("")), None);
        assert_eq!(id_text(&Value::Null), None);
    }
}
