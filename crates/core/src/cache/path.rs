//! Cache path composition.

use std::path::{Path, PathBuf};

use crate::Error;

/// Join `root`, `cache_key` and `filename` into an entry path.
///
/// Both `cache_key` and `filename` must be a single plain path component so an
/// entry can never resolve outside `root`.
pub fn entry_path(root: &Path, cache_key: &str, filename: &str) -> Result<PathBuf, Error> {
    check_component("cache key", cache_key)?;
    check_component("filename", filename)?;
    Ok(root.join(cache_key).join(filename))
}

fn check_component(what: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{what} must not be empty")));
    }
    if value == "." || value == ".." {
        return Err(Error::InvalidInput(format!("{what} must not be a relative path segment")));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidInput(format!("{what} must not contain path separators: {value:?}")));
    }
    Ok(())
}
