use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::{Config, ConfigLoadError};

/// Persist `config` as TOML, replacing `path` atomically.
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigLoadError> {
    let rendered = toml::to_string_pretty(&config.to_file_config())?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let write_err = |source| ConfigLoadError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(rendered.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;

    info!("Saved configuration to {}", path.display());
    Ok(())
}
