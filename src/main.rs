//! topicsync - declarative Kafka topic reconciliation
//!
//! Loads the topics document, connects to the cluster and reconciles every
//! topic in order. Any failure is logged and exits with status 1.

use clap::Parser;
use std::process::ExitCode;
use topicsync::cluster::{AdminClientConfig, KafkaAdminClient};
use topicsync::config::{CliArgs, ConfigSource, LogFormat};
use topicsync::reconcile::{ReconcileOptions, Reconciler};
use topicsync::version::VersionInfo;
use topicsync::Result;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.version {
        println!("{}", VersionInfo::get().git_tag);
        return ExitCode::SUCCESS;
    }

    init_logging(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Topic reconciliation failed");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(args: &CliArgs) {
    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let registry = tracing_subscriber::registry().with(log_filter);
    match args.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .init(),
    }
}

fn run(args: &CliArgs) -> Result<()> {
    info!(version = %VersionInfo::get(), "Starting topicsync");

    let source = ConfigSource::from_args(args);
    info!(source = %source, "Loading topics document");
    let document = source.load()?;

    let client_config = AdminClientConfig::new(document.kafka_brokers.clone())
        .with_request_timeout(args.request_timeout());
    let admin = KafkaAdminClient::connect(&client_config)?;

    let mut reconciler = Reconciler::new(
        admin,
        ReconcileOptions {
            dry_run: args.dry_run,
        },
    );
    let report = reconciler.run(document.topics)?;

    info!(
        topics = report.outcomes.len(),
        created = report.created().len(),
        updated = report.updated().len(),
        planned = report.planned().len(),
        duration_ms = report.duration_ms,
        "Topic reconciliation finished"
    );
    Ok(())
}
