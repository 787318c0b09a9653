use anyhow::{bail, Context, Result};
use diagnostic_service::{config::AppConfig, observability, report, sources::MeasurementCsvSource};
use motor_client::registry::MotorRegistry;
use std::{env, fs};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: diagnose_report <measurements.csv> <motor_id> [output.json]");
    }
    let csv_path = &args[1];
    let motor_id = &args[2];

    // DIAGNOSTIC_CONFIG selects the config file, same as the API server.
    let cfg = AppConfig::load()?;
    observability::init_tracing(cfg.logging.format);

    let registry = MotorRegistry::load(&cfg.registry.path)?;
    let Some(motor) = registry.find_motor(motor_id) else {
        bail!("motor {motor_id} not found in {}", cfg.registry.path);
    };
    let ratings = motor.ratings(cfg.defaults.nominal_voltage);

    let source = MeasurementCsvSource::from_path(csv_path).with_delimiter(cfg.ingest.delimiter_byte()?);
    let bundle = report::diagnose(source, ratings).await?;
    let json = serde_json::to_string_pretty(&bundle)?;

    match args.get(3) {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("failed to write {out}"))?;
            tracing::info!(output = %out, motor_id = %motor_id, "report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
