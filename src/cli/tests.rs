//! Tests for the CLI

use super::*;
use crate::error::Error;
use crate::storage::DuckDbSink;
use crate::worldbank::WORLD_BANK_BASE_URL;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pagewise").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_parse_repeated_flags() {
    let cli = parse(&[
        "-c", "USA", "--country", "CAN", "-i", "SP.POP.TOTL", "-d", "2010:2020", "--limit", "5",
    ]);

    assert_eq!(cli.countries, vec!["USA", "CAN"]);
    assert_eq!(cli.indicators, vec!["SP.POP.TOTL"]);
    assert_eq!(cli.dates, vec!["2010:2020"]);
    assert_eq!(cli.limit, Some(5));
    assert_eq!(cli.format, OutputFormat::Json);
    assert!(cli.database.is_none());
}

#[test]
fn test_settings_from_flags() {
    let runner = Runner::new(parse(&["-i", "A", "-c", "USA"]));
    let settings = runner.settings().unwrap();

    assert_eq!(settings.indicators, vec!["A"]);
    assert_eq!(settings.countries, vec!["USA"]);
    assert_eq!(settings.api.base_url, WORLD_BANK_BASE_URL);
}

#[test]
fn test_settings_require_indicator() {
    let runner = Runner::new(parse(&["-c", "USA"]));
    assert!(matches!(runner.settings(), Err(Error::Config { .. })));
}

#[test]
fn test_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("settings.yaml");
    fs::write(
        &config_path,
        r"
countries: [USA, CAN]
indicators: [NY.GDP.MKTP.CD]
date_intervals: ['2000:2010']
",
    )
    .unwrap();

    let runner = Runner::new(parse(&[
        "--config",
        config_path.to_str().unwrap(),
        "-c",
        "GBR",
        "--base-url",
        "http://localhost:9999",
    ]));
    let settings = runner.settings().unwrap();

    assert_eq!(settings.countries, vec!["GBR"]);
    assert_eq!(settings.indicators, vec!["NY.GDP.MKTP.CD"]);
    assert_eq!(settings.date_intervals, vec!["2000:2010"]);
    assert_eq!(settings.api.base_url, "http://localhost:9999");
}

#[test]
fn test_indicator_flag_completes_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("settings.yaml");
    fs::write(&config_path, "countries: [USA]\n").unwrap();

    let runner = Runner::new(parse(&[
        "--config",
        config_path.to_str().unwrap(),
        "-i",
        "SP.POP.TOTL",
    ]));
    let settings = runner.settings().unwrap();

    assert_eq!(settings.countries, vec!["USA"]);
    assert_eq!(settings.indicators, vec!["SP.POP.TOTL"]);
}

#[test]
fn test_config_file_without_indicators_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("settings.yaml");
    fs::write(&config_path, "countries: [USA]\n").unwrap();

    let runner = Runner::new(parse(&["--config", config_path.to_str().unwrap()]));
    assert!(matches!(runner.settings(), Err(Error::Config { .. })));
}

#[tokio::test]
async fn test_run_stores_into_database() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/country/USA/indicator/A"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 1, "pages": 1},
            [
                {"indicator": {"id": "A"}, "countryiso3code": "USA", "date": "2020", "value": 1.5},
                {"indicator": {"id": "A"}, "countryiso3code": "USA", "date": "2020", "value": 1.5},
                {"indicator": {"id": "A"}, "countryiso3code": "USA", "date": "2019", "value": null}
            ]
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("out.duckdb");

    let runner = Runner::new(parse(&[
        "-c",
        "USA",
        "-i",
        "A",
        "--base-url",
        &mock_server.uri(),
        "--database",
        db_path.to_str().unwrap(),
    ]));
    let stats = runner.run().await.unwrap();

    assert_eq!(stats.read, 3);
    assert_eq!(stats.written, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(DuckDbSink::open(&db_path).unwrap().count().unwrap(), 2);
}
