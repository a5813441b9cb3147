//! Badge catalog loading.

use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use tracing::info;

use crate::domain::BadgeCatalog;
use crate::startup::StartupError;

/// Load the catalog at `path`, or the built-in catalog when `path` is `None`.
///
/// # Examples
///
/// ```rust
/// use progression::startup::load_badge_catalog;
///
/// let catalog = load_badge_catalog(None).expect("built-in catalog");
/// assert!(!catalog.is_empty());
/// ```
pub fn load_badge_catalog(path: Option<&Path>) -> Result<BadgeCatalog, StartupError> {
    let Some(path) = path else {
        let catalog = BadgeCatalog::default();
        info!(badges = catalog.len(), "using built-in badge catalog");
        return Ok(catalog);
    };

    let contents = read_file(path)?;
    let catalog = BadgeCatalog::from_json(&contents).map_err(|source| StartupError::Catalog {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), badges = catalog.len(), "badge catalog loaded");
    Ok(catalog)
}

fn read_file(path: &Path) -> Result<String, StartupError> {
    let read_error = |source: std::io::Error| StartupError::CatalogRead {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "catalog path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(Path::new(file_name)).map_err(read_error)
}
