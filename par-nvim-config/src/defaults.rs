//! Default values for configuration fields.

pub fn nvim_path() -> String {
    "nvim".to_string()
}

pub fn close_timeout_ms() -> u64 {
    2000 // Grace period for the editor to exit before it is killed
}
