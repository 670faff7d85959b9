use crate::utils::{CONFIG_FILE, CONFIG_PATH};
use log::error;
use path_clean::PathClean;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const IO_BUFFER_SIZE: usize = 64 * 1024; // 64kb

pub fn file_writer<W>(w: W) -> std::io::BufWriter<W>
where
    W: std::io::Write,
{
    std::io::BufWriter::with_capacity(IO_BUFFER_SIZE, w)
}

pub fn file_reader<R>(r: R) -> std::io::BufReader<R>
where
    R: std::io::Read,
{
    std::io::BufReader::with_capacity(IO_BUFFER_SIZE, r)
}

pub fn get_exe_path() -> PathBuf {
    let default_path = std::path::PathBuf::from("./");
    let current_exe = std::env::current_exe();
    match current_exe {
        Ok(exe) => {
            match fs::read_link(&exe) {
                Ok(f) => f.parent().map_or(default_path, std::path::Path::to_path_buf),
                Err(_) => exe.parent().map_or(default_path, std::path::Path::to_path_buf)
            }
        }
        Err(_) => default_path
    }
}

fn get_default_path(file: &str) -> String {
    let path: PathBuf = get_exe_path();
    let default_path = path.join(file);
    String::from(if default_path.exists() {
        default_path.to_str().unwrap_or(file)
    } else {
        file
    })
}

pub fn get_default_file_path(config_path: &str, file: &str) -> String {
    let path: PathBuf = PathBuf::from(config_path);
    let default_path = path.join(file);
    String::from(if default_path.exists() {
        default_path.to_str().unwrap_or(file)
    } else {
        file
    })
}

#[inline]
pub fn get_default_config_path() -> String {
    get_default_path(CONFIG_PATH)
}

#[inline]
pub fn get_default_config_file_path(config_path: &str) -> String {
    get_default_file_path(config_path, CONFIG_FILE)
}

pub fn resolve_directory_path(input: &str) -> String {
    let current_dir = std::env::current_dir().unwrap_or_default();

    if input.is_empty() {
        return String::from(current_dir.to_str().unwrap_or("."));
    }

    let input_path = PathBuf::from(input);
    let resolved_path = fs::metadata(&input_path).ok().and_then(|md| {
        if md.is_dir() {
            input_path.canonicalize().ok()
        } else {
            error!("Path is not a directory: {}", input_path.display());
            None
        }
    });

    resolved_path.unwrap_or_else(|| current_dir.join(input).clean())
        .to_string_lossy().to_string()
}

/// Relative paths are resolved against `base_dir`.
pub fn make_path_absolute(path: &str, base_dir: &str) -> PathBuf {
    let pb = PathBuf::from(path);
    if pb.is_relative() {
        PathBuf::from(base_dir).join(pb).clean()
    } else {
        pb.clean()
    }
}

pub fn path_exists(file_path: &Path) -> bool {
    if let Ok(metadata) = fs::metadata(file_path) {
        return metadata.is_file();
    }
    false
}

/// Writes into a temp file next to `path` and renames it over the target,
/// a crash in between leaves the previous content intact.
pub fn write_file_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let mut tmp_file = tempfile::NamedTempFile::new_in(&dir)?;
    {
        let mut writer = file_writer(tmp_file.as_file_mut());
        writer.write_all(content)?;
        writer.flush()?;
    }
    tmp_file.as_file().sync_all()?;
    tmp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Returns `Ok(false)` when there was nothing to delete.
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

pub fn get_file_age(path: &Path) -> std::io::Result<Duration> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(SystemTime::now().duration_since(modified).unwrap_or_default())
}

/// File names (not paths) inside `dir` matching prefix and suffix, sorted.
pub fn list_files_with_prefix(dir: &Path, prefix: &str, suffix: &str) -> std::io::Result<Vec<String>> {
    let mut result = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(prefix) && name.ends_with(suffix) {
                result.push(name.to_string());
            }
        }
    }
    result.sort();
    Ok(result)
}

#[inline]
pub fn open_readonly_file(path: &Path) -> std::io::Result<File> {
    fs::OpenOptions::new().read(true).write(false).truncate(false).create(false).open(path)
}
