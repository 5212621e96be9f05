//! Config file loading

use super::merge::{merge_partial, PartialConfig};
use super::Config;
use crate::error::Error;
use std::fs;
use std::path::PathBuf;

/// Name of the per-project overlay file, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".mkcontext.yaml";

/// `$HOME/.config/mkcontext/config.yaml`
pub fn global_config_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".config").join("mkcontext").join("config.yaml")
}

/// Load the global config, falling back to defaults when the file does not
/// exist. A file that exists but does not parse is a configuration error.
pub fn load_global() -> Result<Config, Error> {
    let path = global_config_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(err.into()),
    };
    let config: Config = serde_yaml::from_str(&content)
        .map_err(|err| Error::Config(format!("{}: {err}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Load the local overlay if present. `Ok(None)` when there is no local file.
pub fn load_local() -> Result<Option<PartialConfig>, Error> {
    let content = match fs::read_to_string(LOCAL_CONFIG_FILE) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let partial: PartialConfig = serde_yaml::from_str(&content)
        .map_err(|err| Error::Config(format!("{LOCAL_CONFIG_FILE}: {err}")))?;
    Ok(Some(partial))
}

/// Global config with the local overlay applied on top.
pub fn load_merged() -> Result<Config, Error> {
    let mut config = load_global()?;
    if let Some(local) = load_local()? {
        merge_partial(&mut config, &local);
    }
    config.validate()?;
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
pub fn save(config: &Config, path: &std::path::Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_yaml::to_string(config)
        .map_err(|err| Error::Config(format!("cannot serialize config: {err}")))?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let config = Config::default();
        save(&config, &path).unwrap();

        let loaded: Config = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        similar_asserts::assert_eq!(loaded, config);
    }
}
