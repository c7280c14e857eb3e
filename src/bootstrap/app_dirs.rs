use std::path::{Path, PathBuf};

use anyhow::anyhow;

const APP_DIR_NAME: &str = "tour-guide";

/// `TOUR_GUIDE_PROFILE=dev` keeps a separate progress record per profile.
fn resolved_app_dir_name() -> String {
    match std::env::var("TOUR_GUIDE_PROFILE") {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

/// Platform data directory for tour progress, e.g. `~/.local/share/tour-guide`.
pub fn default_storage_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir().ok_or_else(|| anyhow!("no platform data directory available"))?;
    Ok(storage_dir_under(&base))
}

fn storage_dir_under(base: &Path) -> PathBuf {
    base.join(resolved_app_dir_name())
}
