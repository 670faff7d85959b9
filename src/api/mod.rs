pub mod config_watch;
pub mod scheduler;
pub mod timer;
