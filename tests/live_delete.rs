mod common;

use common::{Failures, NOT_FOUND_MESSAGE};
use employee_api_tester::poll::until_rate_limited;
use employee_api_tester::{EmployeeFixture, EmployeePayload};
use http::StatusCode;

async fn fixture(config: &employee_api_tester::Config) -> EmployeeFixture {
    EmployeeFixture::create(
        config,
        EmployeePayload::new("testingOriginalForDelete", "2345", "60"),
        StatusCode::OK,
    )
    .await
    .expect("employee to delete")
}

#[tokio::test]
#[ignore = "calls the live Employee service"]
async fn delete_employee() {
    let config = common::config();
    let fixture = fixture(&config).await;

    config
        .given("Delete Employee - Happy Path")
        .when()
        .get(fixture.endpoints.delete(&fixture.id))
        .execute()
        .await
        .unwrap()
        .debug()
        .test_status("response code", |code| code == 200)
        .test_body("response status", |body| body["status"] == "success")
        .test_body("response message", |body| {
            body["message"] == "successfully! deleted Records"
        })
        .assert_all()
        .unwrap();

    // The record should be gone now.
    config
        .given("Delete Employee - Happy Path - Validate")
        .when()
        .get(fixture.endpoints.employee(&fixture.id))
        .execute()
        .await
        .unwrap()
        .debug()
        .test_status("response code", |code| code == 400)
        .assert_all()
        .unwrap();
}

#[tokio::test]
#[ignore = "calls the live Employee service"]
async fn delete_employee_bad_id() {
    let config = common::config();
    let cases = [
        ("Delete Employee - Invalid Id", "0"),
        ("Delete Employee - Id not a number", "s"),
    ];

    let mut failures = Failures::default();
    for (case, id) in cases {
        let result = async {
            config
                .given(case)
                .when()
                .get(config.endpoints().delete(id))
                .execute()
                .await?
                .debug()
                .test_status("response code", |code| code == 400)
                .assert_all()
        };
        failures.record(case, result.await);
    }
    failures.check();
}

#[tokio::test]
#[ignore = "calls the live Employee service"]
async fn delete_employee_without_id() {
    let config = common::config();

    config
        .given("Delete Employee - id is null")
        .when()
        .get(config.endpoints().delete(""))
        .execute()
        .await
        .unwrap()
        .debug()
        .test_status("response code", |code| code == 404)
        .test_body("response message", |body| body["message"] == NOT_FOUND_MESSAGE)
        .assert_all()
        .unwrap();
}

#[tokio::test]
#[ignore = "calls the live Employee service"]
async fn delete_employee_too_many_requests() {
    let config = common::config();
    let fixture = fixture(&config).await;

    let observed = until_rate_limited(|_| {
        config
            .given("Delete Employee - Too many requests")
            .when()
            .get(fixture.endpoints.delete(&fixture.id))
    })
    .await
    .unwrap();

    assert_eq!(observed.then.response().status_code(), 429);
}
