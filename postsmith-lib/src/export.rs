//! The downloadable copy of a raw provider reply.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Result, repository::sanitize_name};

pub const SUFFIX: &str = "_seo.txt";

/// `<network>_seo.txt`, with the network name reduced to characters safe in a file name.
pub fn file_name(target_network: &str) -> String {
    let stem = sanitize_name(target_network);
    if stem.is_empty() {
        format!("post{SUFFIX}")
    } else {
        format!("{stem}{SUFFIX}")
    }
}

/// Write `raw` to `dir`, creating it if needed, and return the path written.
pub fn write_raw(dir: &Path, target_network: &str, raw: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(file_name(target_network));
    fs::write(&path, raw)?;

    debug!("Exported reply to {}", path.display());

    Ok(path)
}
