//! Data directory resolution.

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CAREERPATH_DATA_DIR";

/// Resolve the data directory holding `config.toml` and the database.
///
/// Priority:
/// 1. `CAREERPATH_DATA_DIR` environment variable
/// 2. `~/.careerpath`
/// 3. `.careerpath` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".careerpath");
    }

    PathBuf::from(".careerpath")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_dir_is_named_after_the_app() {
        let dir = resolve_data_dir();
        let ends_with_default = dir.ends_with(".careerpath");
        assert!(ends_with_default || std::env::var(DATA_DIR_ENV).is_ok());
    }
}
