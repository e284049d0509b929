use std::ffi::OsStr;
use std::path::Path;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use metafs::config::{Cli, Command, MetafsConfig};

/// Install the global subscriber: stderr always, plus a plain-text file
/// sink when `log_file` is set. The returned guard flushes the file writer
/// on drop and must outlive the server.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let log_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let log_name = path
                .file_name()
                .unwrap_or_else(|| OsStr::new("metafs.log"));
            let file_appender = tracing_appender::rolling::never(log_dir, log_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        );
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("metafs: failed to set tracing subscriber: {}", e);
    }
    guard
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            bind,
            port,
            log_file,
            no_seed,
            default_uid,
            default_gid,
        } => {
            let guard = init_tracing(log_file.as_deref());

            let config = MetafsConfig {
                bind,
                port,
                log_file,
                seed: !no_seed,
                default_uid,
                default_gid,
            };

            info!(
                "metafs starting: bind={}, port={}, seed={}, default owner={}:{}",
                config.bind, config.port, config.seed, config.default_uid, config.default_gid
            );

            if let Err(e) = metafs::server::run(config).await {
                error!("metafs failed: {}", e);
                eprintln!("Error: {}", e);
                drop(guard);
                std::process::exit(1);
            }
        }
    }
}
