use std::path::PathBuf;

use neutronium_compiler::{
    DEFAULT_CDN_VERSION, DEFAULT_OUT_DIR, DEFAULT_PRAGMA, DEFAULT_PRAGMA_FRAG,
    DEFAULT_TYPE_CHECK_COMMAND,
};

pub fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_cdn_version() -> String {
    DEFAULT_CDN_VERSION.to_string()
}

pub fn default_debounce_ms() -> u64 {
    150
}

pub fn default_type_check_command() -> Vec<String> {
    DEFAULT_TYPE_CHECK_COMMAND
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn default_pragma() -> String {
    DEFAULT_PRAGMA.to_string()
}

pub fn default_pragma_frag() -> String {
    DEFAULT_PRAGMA_FRAG.to_string()
}

pub fn default_true() -> bool {
    true
}
