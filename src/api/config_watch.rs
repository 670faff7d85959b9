use crate::api::scheduler::ScheduledUpdater;
use crate::error::{config_err, VavooError};
use crate::model::AppConfig;
use crate::utils::read_config;
use log::{error, info, warn};
use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{recommended_watcher, Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Re-reads the config file, swaps it in and hands the schedule to the updater.
pub async fn reload_config(app_config: &AppConfig, updater: &ScheduledUpdater) -> Result<(), VavooError> {
    let config = read_config(&app_config.paths)?;
    let current = app_config.current();
    if current.working_dir != config.working_dir {
        warn!("Changed working_dir {} takes effect after restart", config.working_dir);
    }
    let schedule = config.schedule.clone();
    app_config.set_config(config);
    updater.update_schedule(&schedule).await;
    info!("Loaded config file {}", app_config.paths.config_file_path);
    Ok(())
}

/// In-place writes, new files and renames onto the config file count as a change.
fn is_config_change(event: &Event, config_file: &Path) -> bool {
    let relevant = matches!(event.kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
        | EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Name(_)));
    relevant && event.paths.iter().any(|path| path == config_file)
}

fn start_config_watch(app_config: &Arc<AppConfig>, updater: &ScheduledUpdater, cancel_token: &CancellationToken) -> Result<(), VavooError> {
    let config_file = PathBuf::from(&app_config.paths.config_file_path);
    let watch_dir = PathBuf::from(&app_config.paths.config_path);

    let (std_tx, std_rx) = std::sync::mpsc::channel::<notify::Result<notify::Event>>();
    let (tx, mut rx) = tokio::sync::mpsc::channel::<notify::Result<notify::Event>>(100);

    // notify delivers on a std channel, forward into the runtime
    std::thread::spawn(move || {
        for res in std_rx {
            if tx.blocking_send(res).is_err() {
                break;
            }
        }
    });

    let mut watcher = recommended_watcher(std_tx).map_err(|err| config_err!("Failed to init config file watcher {err}"))?;
    watcher.watch(Path::new(&watch_dir), RecursiveMode::NonRecursive)
        .map_err(|err| config_err!("Failed to start config file watcher {err}"))?;
    info!("Watching config file changes {}", config_file.display());

    let cancel = cancel_token.clone();
    let app_config = Arc::clone(app_config);
    let updater = updater.clone();
    tokio::spawn(async move {
        let _keep_watcher_alive = watcher;
        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                Some(res) = rx.recv() => {
                    match res {
                        Ok(event) => {
                            if is_config_change(&event, &config_file) {
                                if let Err(err) = reload_config(&app_config, &updater).await {
                                    error!("Failed to reload config file {}: {err}", config_file.display());
                                }
                            }
                        }
                        Err(err) => error!("watch error: {err:?}"),
                    }
                }

                else => break,
            }
        }
        info!("Configuration file watcher terminated.");
    });

    Ok(())
}

pub fn exec_config_watch(app_config: &Arc<AppConfig>, updater: &ScheduledUpdater, cancel: &CancellationToken) {
    if app_config.current().config_hot_reload {
        if let Err(err) = start_config_watch(app_config, updater, cancel) {
            error!("Failed to start config watch: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::path::PathBuf;
    use notify::event::{AccessKind, AccessMode, CreateKind, DataChange, ModifyKind, RenameMode};
    use notify::{Event, EventKind};
    use crate::api::config_watch::{is_config_change, reload_config};
    use crate::api::scheduler::{ScheduledUpdater, UpdateJob, UpdaterState};
    use crate::api::timer::{SystemClock, TokioTimerScheduler};
    use crate::model::{AppConfig, Config, ConfigPaths};

    struct NoopJob;

    impl UpdateJob for NoopJob {
        fn run(&self) -> BoxFuture<'_, ()> {
            futures::future::ready(()).boxed()
        }
    }

    #[tokio::test]
    async fn test_reload_swaps_config_and_arms_updater() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.yml");
        fs::write(&config_file, "schedule:\n  enabled: true\n  interval_minutes: 15\n").unwrap();
        let paths = ConfigPaths {
            config_path: dir.path().to_string_lossy().to_string(),
            config_file_path: config_file.to_string_lossy().to_string(),
        };
        let app_config = AppConfig::new(Config::default(), paths);
        let updater = ScheduledUpdater::new(Arc::new(TokioTimerScheduler), Arc::new(SystemClock), Arc::new(NoopJob));

        reload_config(&app_config, &updater).await.unwrap();
        assert_eq!(app_config.current().schedule.interval_minutes, 15);
        assert!(matches!(updater.state().await, UpdaterState::Armed { .. }));
        updater.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_config_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.yml");
        fs::write(&config_file, "schedule:\n  interval_minutes: 0\n").unwrap();
        let paths = ConfigPaths {
            config_path: dir.path().to_string_lossy().to_string(),
            config_file_path: config_file.to_string_lossy().to_string(),
        };
        let app_config = AppConfig::new(Config::default(), paths);
        let updater = ScheduledUpdater::new(Arc::new(TokioTimerScheduler), Arc::new(SystemClock), Arc::new(NoopJob));

        assert!(reload_config(&app_config, &updater).await.is_err());
        assert_eq!(app_config.current().schedule.interval_minutes, 360);
        assert_eq!(updater.state().await, UpdaterState::Idle);
    }

    #[test]
    fn test_config_change_events() {
        let config_file = PathBuf::from("/etc/vavoo/config.yml");
        let event = |kind: EventKind, path: &str| Event::new(kind).add_path(PathBuf::from(path));

        assert!(is_config_change(&event(EventKind::Access(AccessKind::Close(AccessMode::Write)), "/etc/vavoo/config.yml"), &config_file));
        assert!(is_config_change(&event(EventKind::Create(CreateKind::File), "/etc/vavoo/config.yml"), &config_file));
        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/etc/vavoo/.config.yml.swp"))
            .add_path(PathBuf::from("/etc/vavoo/config.yml"));
        assert!(is_config_change(&rename, &config_file));

        assert!(!is_config_change(&event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "/etc/vavoo/config.yml"), &config_file));
        assert!(!is_config_change(&event(EventKind::Create(CreateKind::File), "/etc/vavoo/.config.yml.swp"), &config_file));
    }
}
