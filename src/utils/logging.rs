use crate::model::LogLevelConfig;
use crate::utils::config_file_reader;
use env_logger::{Builder, Target};
use log::{info, LevelFilter};
use std::fs::File;

const LOG_ENV_VAR: &str = "VAVOO_LOG";

// http and watcher internals only report errors
const QUIET_MODULES: &[&str] = &[
    "reqwest::connect",
    "hyper_util::client",
    "notify::inotify",
];

fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

fn config_log_level(config_file: &str) -> Option<String> {
    let file = File::open(config_file).ok()?;
    let config: LogLevelConfig = serde_yaml::from_reader(config_file_reader(file, true)).ok()?;
    config.log?.log_level
}

/// Applies `info` or `info,vavoo_maker::api=debug` style levels to the builder.
fn apply_levels(builder: &mut Builder, levels: &str) {
    for part in levels.split(',').filter(|p| !p.trim().is_empty()) {
        match part.split_once('=') {
            Some((module, level)) => {
                builder.filter_module(module.trim(), parse_level(level));
            }
            None => {
                builder.filter_level(parse_level(part));
            }
        }
    }
}

/// Log level priority: cli argument, `VAVOO_LOG`, config file, `info`.
pub fn init_logger(user_log_level: Option<&String>, config_file: &str) {
    let levels = user_log_level.cloned()
        .or_else(|| std::env::var(LOG_ENV_VAR).ok())
        .or_else(|| config_log_level(config_file))
        .unwrap_or_else(|| String::from("info"));

    let mut builder = Builder::new();
    builder.target(Target::Stdout).filter_level(LevelFilter::Info);
    apply_levels(&mut builder, &levels);
    for module in QUIET_MODULES {
        builder.filter_module(module, LevelFilter::Error);
    }
    builder.init();
    info!("Log level {levels}");
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use crate::utils::logging::{config_log_level, parse_level};

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level(" warn "), LevelFilter::Warn);
        assert_eq!(parse_level("whatever"), LevelFilter::Info);
    }

    #[test]
    fn test_config_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.yml");
        std::fs::write(&config_file, "log:\n  log_level: debug\nschedule:\n  enabled: false\n").unwrap();
        assert_eq!(config_log_level(&config_file.to_string_lossy()), Some("debug".to_string()));
        assert_eq!(config_log_level("/nonexistent/config.yml"), None);
    }
}
