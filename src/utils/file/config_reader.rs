use crate::error::{config_err, VavooError};
use crate::model::{Config, ConfigPaths};
use crate::utils::{file_reader, open_readonly_file, CONSTANTS};
use log::error;
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;

enum EitherReader<L, R> {
    Left(L),
    Right(R),
}

impl<L: Read, R: Read> Read for EitherReader<L, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EitherReader::Left(reader) => reader.read(buf),
            EitherReader::Right(reader) => reader.read(buf),
        }
    }
}

/// Reader over a config file, `${env:NAME}` placeholders are replaced when `resolve_env` is set.
pub fn config_file_reader(file: File, resolve_env: bool) -> impl Read
{
    if resolve_env {
        let mut content = String::new();
        if let Err(err) = file_reader(file).read_to_string(&mut content) {
            error!("Failed to read config file: {err}");
        }
        EitherReader::Left(Cursor::new(resolve_env_var(&content).into_bytes()))
    } else {
        EitherReader::Right(BufReader::new(file))
    }
}

pub fn resolve_env_var(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    CONSTANTS.re_env_var.replace_all(value, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|e| {
            error!("Could not resolve env var '{var_name}': {e}");
            format!("${{env:{var_name}}}")
        })
    }).to_string()
}

pub fn read_config(paths: &ConfigPaths) -> Result<Config, VavooError> {
    let config_file = paths.config_file_path.as_str();
    let file = open_readonly_file(&PathBuf::from(config_file))
        .map_err(|err| config_err!("Can't read the config file: {config_file}: {err}"))?;
    let mut config: Config = serde_yaml::from_reader(config_file_reader(file, true))
        .map_err(|err| config_err!("Can't read the config file: {config_file}: {err}"))?;
    config.prepare(paths.config_path.as_str())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use crate::model::ConfigPaths;
    use crate::utils::{read_config, resolve_env_var};

    #[test]
    fn test_resolve() {
        let resolved = resolve_env_var("${env:HOME}");
        assert_eq!(resolved, std::env::var("HOME").unwrap());
        assert_eq!(resolve_env_var("plain"), "plain");
    }

    #[test]
    fn test_read_config_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().to_string_lossy().to_string();
        let config_file = dir.path().join("config.yml");
        fs::write(&config_file, r"
working_dir: data
output:
  bouquet_dir: enigma2
schedule:
  enabled: true
  mode: fixed_time
  fixed_time: '05:30'
").unwrap();
        let paths = ConfigPaths {
            config_path: config_path.clone(),
            config_file_path: config_file.to_string_lossy().to_string(),
        };
        let config = read_config(&paths).unwrap();
        assert_eq!(config.working_dir, format!("{config_path}/data"));
        assert_eq!(config.output.bouquet_dir, format!("{config_path}/enigma2"));
        assert!(config.schedule.enabled);
    }

    #[test]
    fn test_read_config_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.yml");
        fs::write(&config_file, "unknown_field: 1\n").unwrap();
        let paths = ConfigPaths {
            config_path: dir.path().to_string_lossy().to_string(),
            config_file_path: config_file.to_string_lossy().to_string(),
        };
        assert!(read_config(&paths).is_err());
    }
}
