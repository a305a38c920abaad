use crate::diagram::settings::DiagramSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const DIAGRAM_SETTINGS_FILE_NAME: &str = "eye_diagram_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(DIAGRAM_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Loads the settings file next to the executable, falling back to defaults
/// when it does not exist.
pub fn load() -> Result<DiagramSettings> {
    let path = resolve_settings_path()?;
    Ok(load_from_path(&path)?.unwrap_or_default())
}

pub fn save(settings: &DiagramSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<Option<DiagramSettings>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read diagram settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(Some(DiagramSettings::default()));
    }

    let mut loaded: DiagramSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize diagram settings file {}", path.display()))?;
    loaded.sanitize();
    Ok(Some(loaded))
}

pub fn save_to_path(path: &Path, settings: &DiagramSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create diagram settings folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize diagram settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write diagram settings file {}", path.display()))
}
