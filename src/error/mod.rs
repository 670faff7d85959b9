mod vavoo_error;

pub use self::vavoo_error::*;
