use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$SITELEDGER_HOME`, else `~/.siteledger`
pub fn siteledger_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("SITELEDGER_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".siteledger"))
}

pub fn ensure_siteledger_home() -> Result<PathBuf> {
    let dir = siteledger_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
