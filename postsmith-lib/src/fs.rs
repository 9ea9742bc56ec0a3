use std::{fs::create_dir_all, path::PathBuf};

use xdg::BaseDirectories;

use crate::{Error, Result};

/// Returns the path to the Postsmith configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> Result<PathBuf> {
    let path = xdg_prefix().get_config_home().ok_or(Error::NoHomeDir)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the path to the Postsmith data directory. If it doesn't exist when this function is
/// called, it will be created.
pub fn data_dir() -> Result<PathBuf> {
    let path = xdg_prefix().get_data_home().ok_or(Error::NoHomeDir)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the path to the Postsmith state directory. If it doesn't exist when this function is
/// called, it will be created.
pub fn state_dir() -> Result<PathBuf> {
    let path = xdg_prefix().get_state_home().ok_or(Error::NoHomeDir)?;

    create_dir_all(&path)?;

    Ok(path)
}

fn xdg_prefix() -> BaseDirectories {
    xdg::BaseDirectories::with_prefix("postsmith")
}
