use anyhow::{Context, Result};
use inetify_core::Settings;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "inetify.yaml";

/// Loads settings from `path`, or from `./inetify.yaml` if present, or
/// falls back to defaults. An explicitly given file must exist and parse.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(CONFIG_FILE_NAME);
            if p.exists() { p.to_path_buf() } else { return Ok(Settings::default()); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    parse_settings(&s).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_settings(yaml: &str) -> Result<Settings> {
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
