use std::fs;
use std::path::Path;

use crate::io::workspace::WorkspaceError;
use crate::model::config::Config;

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(data_dir: &Path) -> Result<(Config, toml_edit::DocumentMut), WorkspaceError> {
    let config_path = data_dir.join("config.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = data_dir.join("config.toml");
    fs::write(&config_path, doc.to_string()).map_err(|e| WorkspaceError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

/// Set `[ui] default_project` in the config document
pub fn set_default_project(doc: &mut toml_edit::DocumentMut, index: usize) {
    if !doc.contains_key("ui") {
        doc["ui"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"]["default_project"] = toml_edit::value(index as i64);
}
