use std::time::Duration;

use chrono::Utc;

use ecobs_service::logging::{self, DataSource, LogLevel};
use ecobs_service::{config, db, pipeline, regions};

fn main() {
    dotenv::dotenv().ok();

    let settings = match config::load(config::DEFAULT_CONFIG_PATH) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to read {}: {}", config::DEFAULT_CONFIG_PATH, e);
            std::process::exit(1);
        }
    };

    logging::init_logger(LogLevel::Info, settings.log_file.as_deref(), true);

    let database_url = match config::database_url(&settings) {
        Ok(url) => url,
        Err(e) => {
            logging::error(DataSource::System, None, &e.to_string());
            std::process::exit(1);
        }
    };

    let mut db_client = match db::connect(&database_url) {
        Ok(client) => client,
        Err(e) => {
            logging::error(
                DataSource::Database,
                None,
                &format!("connection failed: {}", e),
            );
            std::process::exit(1);
        }
    };

    let http = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            logging::error(
                DataSource::System,
                None,
                &format!("HTTP client setup failed: {}", e),
            );
            std::process::exit(1);
        }
    };

    let region_codes: Vec<String> = match &settings.regions {
        Some(codes) if !codes.is_empty() => codes.clone(),
        _ => regions::all_region_codes()
            .iter()
            .map(|c| c.to_string())
            .collect(),
    };
    let codes: Vec<&str> = region_codes.iter().map(String::as_str).collect();

    let report = pipeline::run(&http, &mut db_client, &codes, Utc::now());

    if std::env::args().any(|arg| arg == "--json") {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => logging::error(
                DataSource::System,
                None,
                &format!("report serialization failed: {}", e),
            ),
        }
    }
}
