mod file_utils;
mod file_lock_manager;
mod config_reader;

pub use self::file_utils::*;
pub use self::file_lock_manager::*;
pub use self::config_reader::*;
