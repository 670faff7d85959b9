use crate::utils::{DEFAULT_INDEX_FILE, DEFAULT_USER_AGENT};

pub const fn default_as_true() -> bool { true }

pub fn default_working_dir() -> String { String::from("/tmp/vavoo") }

pub fn default_source_url() -> String { String::from("https://vavoo.to/channels") }
pub fn default_stream_base_url() -> String { String::from("https://vavoo.to") }

pub const fn default_fetch_timeout_ms() -> u64 { 2500 }
pub const fn default_signature_timeout_ms() -> u64 { 5000 }
pub const fn default_cache_max_age_secs() -> u64 { 86_400 }

pub fn default_user_agent() -> String { String::from(DEFAULT_USER_AGENT) }
pub fn default_signature_field() -> String { String::from("addonSig") }

pub fn default_bouquet_dir() -> String { String::from("/etc/enigma2") }
pub fn default_index_file() -> String { String::from(DEFAULT_INDEX_FILE) }
pub const fn default_service_type() -> u32 { 4097 }

pub const fn default_interval_minutes() -> u32 { 360 }
pub fn default_fixed_time() -> String { String::from("05:00") }
