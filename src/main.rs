#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
mod modules;

include_modules!();

use crate::api::config_watch::exec_config_watch;
use crate::api::scheduler::ScheduledUpdater;
use crate::api::timer::{SystemClock, TokioTimerScheduler};
use crate::error::{VavooError, VavooErrorKind};
use crate::model::{AppConfig, Config, ConfigPaths, ViewType};
use crate::processing::pipeline::Pipeline;
use crate::utils::network::request::create_client;
use crate::utils::{format_timestamp, init_logger, path_exists, read_config, resolve_env_var};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "vavoo_maker")]
#[command(version)]
#[command(about = "Creates Enigma2 bouquets from the Vavoo channel list", long_about = None)]
struct Args {
    /// The config directory
    #[arg(short = 'p', long = "config-path")]
    config_path: Option<String>,

    /// The config file
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// log level
    #[arg(short = 'l', long = "log-level", default_missing_value = "info")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the groups of a view, selected groups are marked with [x]
    List {
        #[arg(short = 'v', long)]
        view: Option<ViewType>,
    },
    /// Create bouquets, without groups the saved selection of the view is used
    Create {
        #[arg(short = 'v', long)]
        view: Option<ViewType>,
        groups: Vec<String>,
    },
    /// Remove the bouquets of the given groups
    Remove {
        #[arg(required = true)]
        groups: Vec<String>,
    },
    /// Remove every vavoo bouquet
    RemoveAll,
    /// Refresh all favourite bouquets now
    Update,
    /// Show last update and favourites
    Status,
    /// Run the scheduled updater until interrupted
    Daemon,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config_paths = get_file_paths(&args);

    init_logger(args.log_level.as_ref(), config_paths.config_file_path.as_str());
    info!("Version: {VERSION}");

    let config = load_config(&config_paths).unwrap_or_else(|err| exit!("{}", err));
    let app_config = Arc::new(AppConfig::new(config, config_paths));
    print_info(&app_config);

    let client = create_client(&app_config.current()).build().unwrap_or_else(|err| {
        error!("Failed to build client {err}");
        reqwest::Client::new()
    });
    let pipeline = Arc::new(Pipeline::new(Arc::clone(&app_config), client));

    if let Err(err) = run_command(args.command, &app_config, pipeline).await {
        eprintln!("{err}");
        if err.kind == VavooErrorKind::Config {
            std::process::exit(1);
        }
    }
}

fn get_file_paths(args: &Args) -> ConfigPaths {
    let config_path: String = utils::resolve_directory_path(&resolve_env_var(&args.config_path.as_ref().map_or_else(utils::get_default_config_path, ToString::to_string)));
    let config_file: String = resolve_env_var(&args.config_file.as_ref().map_or_else(|| utils::get_default_config_file_path(&config_path), ToString::to_string));
    ConfigPaths {
        config_path,
        config_file_path: config_file,
    }
}

fn load_config(paths: &ConfigPaths) -> Result<Config, VavooError> {
    if path_exists(&PathBuf::from(&paths.config_file_path)) {
        read_config(paths)
    } else {
        warn!("Config file {} not found, using defaults", paths.config_file_path);
        let mut config = Config::default();
        config.prepare(&paths.config_path)?;
        Ok(config)
    }
}

fn print_info(app_config: &AppConfig) {
    let config = app_config.current();
    info!("Current time: {}", chrono::offset::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("Working dir: {:?}", &config.working_dir);
    info!("Config dir: {:?}", &app_config.paths.config_path);
    info!("Config file: {:?}", &app_config.paths.config_file_path);
    info!("Bouquet dir: {:?}", &config.output.bouquet_dir);
}

async fn run_command(command: Command, app_config: &Arc<AppConfig>, pipeline: Arc<Pipeline>) -> Result<(), VavooError> {
    match command {
        Command::List { view } => {
            let view = resolve_view(&pipeline, view);
            for group in pipeline.list_groups(view).await? {
                let marker = if group.selected { "[x]" } else { "[ ]" };
                println!("{marker} {}", group.label);
            }
        }
        Command::Create { view, groups } => {
            let view = resolve_view(&pipeline, view);
            let result = pipeline.create_bouquets(view, &groups).await?;
            println!("{} bouquets created, {} empty, {} failed", result.written.len(), result.skipped_empty.len(), result.failed.len());
        }
        Command::Remove { groups } => {
            let result = pipeline.remove_bouquets(&groups).await?;
            println!("{} bouquets removed, {} not found", result.removed.len(), result.missing.len());
        }
        Command::RemoveAll => {
            let result = pipeline.remove_all_bouquets().await?;
            println!("{} bouquets removed", result.removed.len());
        }
        Command::Update => {
            match pipeline.run_scheduled_update().await? {
                Some(report) => println!("{} bouquets updated, {} failed", report.updated.len(), report.failed.len()),
                None => println!("Update already running"),
            }
        }
        Command::Status => print_status(&pipeline)?,
        Command::Daemon => run_daemon(app_config, pipeline).await,
    }
    Ok(())
}

fn resolve_view(pipeline: &Pipeline, view: Option<ViewType>) -> ViewType {
    view.unwrap_or_else(|| pipeline.settings().map(|s| s.current_view).unwrap_or_default())
}

fn print_status(pipeline: &Pipeline) -> Result<(), VavooError> {
    let settings = pipeline.settings()?;
    println!("Current view: {}", settings.current_view.title());
    println!("Last update: {}", settings.last_update.as_deref().unwrap_or("never"));
    let favourites = pipeline.favourites();
    if favourites.is_empty() {
        println!("No favourites");
    }
    for record in &favourites.records {
        println!("{} ({}) exported {}", record.group, record.view, format_timestamp(record.timestamp));
    }
    Ok(())
}

async fn run_daemon(app_config: &Arc<AppConfig>, pipeline: Arc<Pipeline>) {
    let cancel_token = CancellationToken::new();
    let schedule_config = Arc::clone(app_config);
    let updater = ScheduledUpdater::new(Arc::new(TokioTimerScheduler), Arc::new(SystemClock), pipeline)
        .with_schedule_source(Arc::new(move || schedule_config.current().schedule.clone()));
    updater.update_schedule(&app_config.current().schedule).await;
    exec_config_watch(app_config, &updater, &cancel_token);

    if !app_config.current().schedule.enabled {
        info!("Scheduled update is disabled, waiting for config changes");
    }
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutting down");
    cancel_token.cancel();
    updater.stop().await;
}
