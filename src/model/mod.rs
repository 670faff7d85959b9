mod config;
mod favourites;
mod playlist;
mod settings;
mod view_type;

pub use self::config::*;
pub use self::favourites::*;
pub use self::playlist::*;
pub use self::settings::*;
pub use self::view_type::*;
