pub mod bootstrap;
pub mod capture;
pub mod cli;
pub mod compress;
pub mod config;
pub mod doctor;
pub mod error;
pub mod history;
pub mod output;
pub mod ui;
pub mod upload;
pub mod workflow;

use clap::Parser;

use crate::bootstrap::AppPaths;
use crate::capture::CaptureMode;
use crate::cli::{Cli, Command};
use crate::config::{load_config, AppConfig};
use crate::doctor::run_doctor;
use crate::error::AppResult;
use crate::history::HistoryStore;
use crate::ui::Notifier;
use crate::workflow::CaptureOptions;

trait CommandExecutor {
    async fn capture(
        &self,
        config: &mut AppConfig,
        paths: &AppPaths,
        options: CaptureOptions,
    ) -> AppResult<()>;
    async fn clipboard(&self, config: &mut AppConfig, paths: &AppPaths) -> AppResult<()>;
    fn history(&self, paths: &AppPaths) -> AppResult<()>;
    fn clear_history(&self, paths: &AppPaths) -> AppResult<()>;
    fn doctor(&self, paths: &AppPaths, config: &AppConfig, json: bool) -> AppResult<()>;
}

struct DefaultCommandExecutor;

impl CommandExecutor for DefaultCommandExecutor {
    async fn capture(
        &self,
        config: &mut AppConfig,
        paths: &AppPaths,
        options: CaptureOptions,
    ) -> AppResult<()> {
        let history = HistoryStore::new(paths.history_file.clone());
        let notifier = Notifier::new(config.notify);
        workflow::capture_and_upload(config, paths, &history, &notifier, options).await
    }

    async fn clipboard(&self, config: &mut AppConfig, paths: &AppPaths) -> AppResult<()> {
        let history = HistoryStore::new(paths.history_file.clone());
        let notifier = Notifier::new(config.notify);
        workflow::clipboard_upload(config, paths, &history, &notifier).await
    }

    fn history(&self, paths: &AppPaths) -> AppResult<()> {
        workflow::show_history(&HistoryStore::new(paths.history_file.clone()))
    }

    fn clear_history(&self, paths: &AppPaths) -> AppResult<()> {
        workflow::clear_history(&HistoryStore::new(paths.history_file.clone()))
    }

    fn doctor(&self, paths: &AppPaths, config: &AppConfig, json: bool) -> AppResult<()> {
        let report = run_doctor(paths, config);
        if json {
            println!("{}", report.render_json()?);
        } else {
            println!("{}", report.render_text());
        }
        Ok(())
    }
}

async fn execute_command<E: CommandExecutor>(
    command: Command,
    paths: AppPaths,
    mut config: AppConfig,
    executor: &E,
) -> AppResult<()> {
    match command {
        Command::Partial { capture, service } => {
            executor
                .capture(
                    &mut config,
                    &paths,
                    CaptureOptions {
                        mode: CaptureMode::Partial,
                        file_name: capture.file_name,
                        service,
                    },
                )
                .await
        }
        Command::Fullscreen { capture } => {
            executor
                .capture(
                    &mut config,
                    &paths,
                    CaptureOptions {
                        mode: CaptureMode::Fullscreen,
                        file_name: capture.file_name,
                        service: None,
                    },
                )
                .await
        }
        Command::Window { capture } => {
            executor
                .capture(
                    &mut config,
                    &paths,
                    CaptureOptions {
                        mode: CaptureMode::Window,
                        file_name: capture.file_name,
                        service: None,
                    },
                )
                .await
        }
        Command::Clipboard { .. } => executor.clipboard(&mut config, &paths).await,
        Command::History => executor.history(&paths),
        Command::ClearHistory => executor.clear_history(&paths),
        Command::Doctor { json } => executor.doctor(&paths, &config, json),
    }
}

fn init_tracing(paths: &AppPaths, verbose: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_directive = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file_layer = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_file)
        .ok()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_target(false)
                .with_ansi(false)
        });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer);
    if let Some(layer) = file_layer {
        let _ = subscriber.with(layer).try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut paths = AppPaths::resolve()?;
    if let Some(config_file) = &cli.config {
        paths.config_file = config_file.clone();
    }
    paths.ensure_dirs()?;

    let overrides = cli.to_overrides();
    init_tracing(&paths, overrides.verbose.unwrap_or(false));
    let config = load_config(&paths, &overrides)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(execute_command(
        cli.command,
        paths,
        config,
        &DefaultCommandExecutor,
    ));
    if let Err(error) = &result {
        tracing::error!("{error}");
    }
    result
}
