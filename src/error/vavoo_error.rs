use std::error::Error;
use std::fmt::{Display, Formatter, Result};

#[macro_export]
macro_rules! network_err {
    ($($arg:tt)*) => {
        $crate::error::VavooError::new($crate::error::VavooErrorKind::Network, format!($($arg)*))
    };
}
pub use network_err;

#[macro_export]
macro_rules! parse_err {
    ($($arg:tt)*) => {
        $crate::error::VavooError::new($crate::error::VavooErrorKind::Parse, format!($($arg)*))
    };
}
pub use parse_err;

#[macro_export]
macro_rules! io_err {
    ($($arg:tt)*) => {
        $crate::error::VavooError::new($crate::error::VavooErrorKind::Io, format!($($arg)*))
    };
}
pub use io_err;

#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        $crate::error::VavooError::new($crate::error::VavooErrorKind::Config, format!($($arg)*))
    };
}
pub use config_err;

#[macro_export]
macro_rules! config_err_res {
    ($($arg:tt)*) => {
        Err($crate::error::VavooError::new($crate::error::VavooErrorKind::Config, format!($($arg)*)))
    };
}
pub use config_err_res;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VavooErrorKind {
    // fetch timeout or http failure, caller falls back to the cache
    Network,
    // malformed json or record
    Parse,
    // file write or delete failure
    Io,
    Config,
}

impl Display for VavooErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = match self {
            Self::Network => "network",
            Self::Parse => "parse",
            Self::Io => "io",
            Self::Config => "config",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug)]
pub struct VavooError {
    pub kind: VavooErrorKind,
    pub message: String,
}

impl VavooError {
    pub const fn new(kind: VavooErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn is_network(&self) -> bool {
        self.kind == VavooErrorKind::Network
    }
}

impl Display for VavooError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "Vavoo {} error: {}", self.kind, self.message)
    }
}

impl Error for VavooError {}

impl From<std::io::Error> for VavooError {
    fn from(err: std::io::Error) -> Self {
        Self::new(VavooErrorKind::Io, err.to_string())
    }
}
