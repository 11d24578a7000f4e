use log::warn;

/// Reads a numeric environment variable. Values that fail to parse are ignored.
pub fn get_env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok()?;

    match value.parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} must be a valid number but was {:?}, ignoring", key, value);
            None
        }
    }
}
