use std::fs;
use std::path::Path;

use anyhow::Context;
use types::Settings;

/// Read settings from a JSON file. Missing fields take their defaults,
/// continuous knobs are clamped, and the result must validate.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let mut settings: Settings = serde_json::from_str(&data)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    settings.sanitize();
    settings
        .validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("writing settings to {}", path.display()))?;
    Ok(())
}
