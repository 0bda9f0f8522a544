use std::process;

use scenecache::{
    application::{
        error::AppError,
        soak::{self, SoakPlan},
    },
    cache::CacheRegistry,
    config,
    infra::{error::InfraError, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(source = report.source, error = %report.chain(), "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(source = report.source, error = %report.chain(), "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Soak(config::SoakArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Soak(args) => run_soak(settings, args).await,
        config::Command::ShowConfig => print_json(&settings.cache),
    }
}

async fn run_soak(settings: config::Settings, args: config::SoakArgs) -> Result<(), AppError> {
    let registry = CacheRegistry::start(settings.cache.clone())?;
    info!(
        target = "scenecache::soak",
        sweep_interval_ms = settings.cache.sweep_interval_ms,
        "Cache registry started"
    );

    let result = soak::run(registry.clone(), SoakPlan::from(&args)).await;
    registry.dispose();

    print_json(&result?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(InfraError::from)?;
    println!("{rendered}");
    Ok(())
}
