use anyhow::Result;
use datapush::utils::validation::Validate;
use datapush::{AppConfig, DataLoader, HttpDispatcher, LocalStorage, PushError, Scheduler};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> Result<()> {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[tokio::test]
async fn test_config_driven_run_against_mock_api() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write(&temp_dir, "data/orders.csv", "order;qty\nA-1;3\n")?;
    write(&temp_dir, "data/customer.json", r#"{"name": "Ada"}"#)?;
    write(&temp_dir, "data/late.json", r#"{"late": true}"#)?;

    let server = MockServer::start();

    let bootstrap_mock = server.mock(|when, then| {
        when.method(POST).path("/ingest").json_body(json!({
            "source": "replay",
            "data": [{"order": "A-1", "qty": "3"}]
        }));
        then.status(200);
    });
    let customer_mock = server.mock(|when, then| {
        when.method(POST).path("/ingest").json_body(json!({
            "source": "replay",
            "data": {"name": "Ada"}
        }));
        then.status(200);
    });
    let late_mock = server.mock(|when, then| {
        when.method(POST).path("/ingest").json_body(json!({
            "source": "replay",
            "data": {"late": true}
        }));
        then.status(200);
    });

    let config_content = format!(
        r#"{{
            "api": {{
                "endpoint": "{}",
                "request_method": "post",
                "payload": {{"source": "replay", "data": "${{data_files}}"}}
            }},
            "data_files": {{"files": ["data/orders.csv"]}},
            "csv_delimiter": ";",
            "schedule": {{
                "period": 3,
                "duration": 0,
                "push_by_limitation": true,
                "data_files": ["data/customer.json", "data/late.json"]
            }}
        }}"#,
        server.url("/ingest")
    );

    let config = AppConfig::from_json_str(&config_content)?;
    config.validate()?;
    let settings = config.into_settings()?;

    let loader = DataLoader::new(LocalStorage::new(temp_dir.path()), settings.delimiter);
    let dispatcher = HttpDispatcher::new(settings.api.clone())?;
    let summary = Scheduler::new(settings.plan, loader, dispatcher)
        .run()
        .await?;

    bootstrap_mock.assert_hits(1);
    customer_mock.assert_hits(2);
    late_mock.assert_hits(1);
    assert_eq!(summary.dispatches, 4);
    assert_eq!(summary.cycles, 3);
    Ok(())
}

#[tokio::test]
async fn test_invalid_method_never_reaches_the_network() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.path("/ingest");
        then.status(200);
    });

    let config_content = format!(
        r#"{{"api": {{"endpoint": "{}", "request_method": "get"}}, "data_files": {{"files": ["x.json"]}}}}"#,
        server.url("/ingest")
    );
    let err = AppConfig::from_json_str(&config_content)?
        .into_settings()
        .unwrap_err();

    assert!(matches!(err, PushError::InvalidConfigValueError { .. }));
    api_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_malformed_data_stops_the_schedule() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write(&temp_dir, "good.json", r#"{"ok": 1}"#)?;
    write(&temp_dir, "bad.json", r#"{"ok": "#)?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(PUT).path("/ingest");
        then.status(200);
    });

    let config_content = format!(
        r#"{{
            "api": {{"endpoint": "{}", "request_method": "PUT"}},
            "schedule": {{"period": -1, "duration": 0, "data_files": ["good.json", "bad.json"]}}
        }}"#,
        server.url("/ingest")
    );
    let settings = AppConfig::from_json_str(&config_content)?.into_settings()?;

    let loader = DataLoader::new(LocalStorage::new(temp_dir.path()), settings.delimiter);
    let dispatcher = HttpDispatcher::new(settings.api.clone())?;
    let err = Scheduler::new(settings.plan, loader, dispatcher)
        .with_cycle_cap(10)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::ParseError { .. }));
    api_mock.assert_hits(1);
    Ok(())
}
