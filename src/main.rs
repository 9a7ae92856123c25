use employee_api_tester::employee::record;
use employee_api_tester::{Config, Then};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Read-only smoke checks against the configured service.
#[tokio::main]
async fn main() -> Result<()> {
    employee_api_tester::init_logging();
    let config = Config::from_env()?;
    log::info!("running smoke checks against {}", config.base_url);

    let mut failed = 0;
    for outcome in [list_employees(&config).await, get_employee(&config, "1").await] {
        match outcome {
            Ok(name) => println!("ok      {name}"),
            Err(err) => {
                failed += 1;
                println!("FAILED  {err}");
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} smoke check(s) failed").into());
    }
    Ok(())
}

async fn list_employees(config: &Config) -> employee_api_tester::Result<String> {
    let then = config
        .given("Get employees- Happy Path")
        .when()
        .get(config.endpoints().employees())
        .execute()
        .await?
        .test_status("response code", |code| code == 200)
        .test_body("response status", |body| body["status"] == "success")
        .test_body("response data id", |body| record(body)["id"].as_i64() > Some(0))
        .test_body("response data name", |body| !record(body)["employee_name"].is_null());
    finish(then)
}

async fn get_employee(config: &Config, id: &str) -> employee_api_tester::Result<String> {
    let then = config
        .given("Get Employee - Happy Path")
        .when()
        .get(config.endpoints().employee(id))
        .execute()
        .await?
        .test_status("response code", |code| code == 200)
        .test_body("response status", |body| body["status"] == "success")
        .test_body("response data id", |body| !record(body)["id"].is_null());
    finish(then)
}

fn finish(then: Then) -> employee_api_tester::Result<String> {
    then.assert_all()?;
    Ok(then.spec().name().to_string())
}
