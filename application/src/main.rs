use std::{io, process::ExitCode, sync::OnceLock};

use application::{Args, Cmd, Config};
use common::{Date, Handler as _};
use serde::Serialize;
use service::{
    command::{MigrateContracts, RecalculateContract},
    domain::contract::legacy,
    infra::Json,
    query, read, Service,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

async fn start() -> Result<(), ()> {
    let Args {
        config,
        as_of,
        command,
    } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        store,
        service,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let json = Json::open(store.path.clone()).await.map_err(|e| {
        log::error!("failed to open JSON store at `{}`: {e}", store.path);
    })?;
    let service = Service::new(service.into(), json);

    let as_of = as_of.unwrap_or_else(Date::today);

    match command {
        Cmd::List => {
            let contracts = service
                .execute(query::contracts::List::by(read::contract::All))
                .await
                .map_err(|e| {
                    log::error!("failed to list contracts: {e}");
                })?;
            print_json(
                &contracts
                    .iter()
                    .map(legacy::Record::from)
                    .collect::<Vec<_>>(),
            )
        }
        Cmd::Summary { id } => {
            let summary = service
                .execute(query::summary::Summarize {
                    contract_id: id,
                    as_of,
                })
                .await
                .map_err(|e| {
                    log::error!("failed to calculate summary: {e}");
                })?;
            print_json(&summary)
        }
        Cmd::Status { id } => {
            let status = service
                .execute(query::status::Classify {
                    contract_id: id,
                    as_of,
                })
                .await
                .map_err(|e| {
                    log::error!("failed to classify status: {e}");
                })?
                .ok_or_else(|| {
                    log::error!("`Contract(id: {id})` does not exist");
                })?;
            println!("{status}: {}", status.description());
            Ok(())
        }
        Cmd::Payments { id } => {
            let payments = service
                .execute(query::payments::Summarize { contract_id: id })
                .await
                .map_err(|e| {
                    log::error!("failed to summarize payments: {e}");
                })?
                .ok_or_else(|| {
                    log::error!("`Contract(id: {id})` does not exist");
                })?;
            print_json(&payments)
        }
        Cmd::Recalculate { id } => {
            let contract = service
                .execute(RecalculateContract {
                    contract_id: id,
                    as_of,
                })
                .await
                .map_err(|e| {
                    log::error!("failed to recalculate contract: {e}");
                })?;
            print_json(&legacy::Record::from(&contract))
        }
        Cmd::Audit { id: Some(id) } => {
            let audit = service
                .execute(query::audit::One {
                    contract_id: id,
                    as_of,
                })
                .await
                .map_err(|e| {
                    log::error!("failed to audit contract: {e}");
                })?
                .ok_or_else(|| {
                    log::error!("`Contract(id: {id})` does not exist");
                })?;
            print_json(&audit)
        }
        Cmd::Audit { id: None } => {
            let report = service
                .execute(query::audit::All { as_of })
                .await
                .map_err(|e| {
                    log::error!("failed to audit the collection: {e}");
                })?;
            print_json(&report)
        }
        Cmd::Migrate => {
            let report = service
                .execute(MigrateContracts { as_of })
                .await
                .map_err(|e| {
                    log::error!("failed to migrate the collection: {e}");
                })?;
            println!(
                "migrated: {}\nunchanged: {}\nskipped: {}",
                report.migrated, report.unchanged, report.skipped,
            );
            Ok(())
        }
    }
}

/// Prints the provided `value` to stdout as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> Result<(), ()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        log::error!("failed to serialize output: {e}");
    })?;
    println!("{json}");
    Ok(())
}
