use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::apply::ApplyOptions;
use crate::matcher::{Cutoff, DEFAULT_CUTOFF};
use crate::report::{DEFAULT_PREVIEW_LIMIT, DEFAULT_PREVIEW_WIDTH};

const SETTINGS_FILE: &str = "xlf-populate.toml";
const LOCAL_SETTINGS_FILE: &str = "xlf-populate.local.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub preserve_tags: bool,
    pub fuzzy: bool,
    pub fuzzy_cutoff: f64,
    pub preview: bool,
    pub preview_limit: usize,
    pub preview_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preserve_tags: false,
            fuzzy: false,
            fuzzy_cutoff: DEFAULT_CUTOFF,
            preview: false,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            preview_width: DEFAULT_PREVIEW_WIDTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    apply: Option<ApplySettings>,
    report: Option<ReportSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ApplySettings {
    preserve_tags: Option<bool>,
    fuzzy: Option<bool>,
    fuzzy_cutoff: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportSettings {
    preview: Option<bool>,
    preview_limit: Option<usize>,
    preview_width: Option<usize>,
}

/// Loads settings from the working directory, then from `extra_path` if given.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    load_settings_from(Path::new("."), extra_path)
}

pub fn load_settings_from(dir: &Path, extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let mut ordered_paths = vec![dir.join(SETTINGS_FILE), dir.join(LOCAL_SETTINGS_FILE)];
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            settings.merge(read_settings_file(&path)?);
        }
    }

    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse settings: {}", path.display()))
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(apply) = incoming.apply {
            if let Some(preserve_tags) = apply.preserve_tags {
                self.preserve_tags = preserve_tags;
            }
            if let Some(fuzzy) = apply.fuzzy {
                self.fuzzy = fuzzy;
            }
            if let Some(cutoff) = apply.fuzzy_cutoff {
                self.fuzzy_cutoff = cutoff;
            }
        }
        if let Some(report) = incoming.report {
            if let Some(preview) = report.preview {
                self.preview = preview;
            }
            if let Some(limit) = report.preview_limit {
                if limit > 0 {
                    self.preview_limit = limit;
                }
            }
            if let Some(width) = report.preview_width {
                if width > 0 {
                    self.preview_width = width;
                }
            }
        }
    }

    pub fn apply_options(&self) -> Result<ApplyOptions> {
        let fuzzy_cutoff = Cutoff::new(self.fuzzy_cutoff)
            .with_context(|| "invalid apply.fuzzy_cutoff setting")?;
        Ok(ApplyOptions {
            preserve_tags: self.preserve_tags,
            fuzzy: self.fuzzy,
            fuzzy_cutoff,
        })
    }
}
