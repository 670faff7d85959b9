mod app;
mod main_config;
mod log;
mod output;
mod schedule;
mod signature;
mod source;

pub use self::app::*;
pub use self::main_config::*;
pub use self::log::*;
pub use self::output::*;
pub use self::schedule::*;
pub use self::signature::*;
pub use self::source::*;
