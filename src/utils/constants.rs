use regex::Regex;
use std::sync::LazyLock;

pub const CONFIG_PATH: &str = "config";
pub const CONFIG_FILE: &str = "config.yml";
pub const SETTINGS_FILE: &str = "settings.json";
pub const FAVOURITES_FILE: &str = "favourites.json";
pub const PLAYLIST_CACHE_FILE: &str = "vavoo.cache.json";

pub const BOUQUET_FILE_PREFIX: &str = "userbouquet.vavoo.";
pub const BOUQUET_FILE_SUFFIX: &str = ".tv";
pub const DEFAULT_INDEX_FILE: &str = "bouquets.tv";

/// Group keys containing one of these markers are categories, the rest are countries.
pub const CATEGORY_SEPARATORS: &[&str] = &["➾", "⟾", "->"];

pub const DEFAULT_USER_AGENT: &str = "VAVOO/2.6";

pub struct Constants {
    pub re_env_var: Regex,
    pub re_trailing_annotation: Regex,
    pub re_html_entity: Regex,
    pub re_bouquet_reference: Regex,
}

pub static CONSTANTS: LazyLock<Constants> = LazyLock::new(||
    Constants {
        re_env_var: Regex::new(r"\$\{env:(?P<var>[a-zA-Z_][a-zA-Z0-9_]*)}").unwrap(),
        re_trailing_annotation: Regex::new(r"\s*(\([^()]*\)|\[[^\[\]]*\])\s*$").unwrap(),
        re_html_entity: Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap(),
        re_bouquet_reference: Regex::new(r#"FROM BOUQUET "(?P<file>[^"]+)""#).unwrap(),
    });
