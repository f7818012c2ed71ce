//! Editor configuration and loader.
//!
//! Settings come from an optional `formwright.toml`. Every key has a default,
//! so a partial file only overrides what it names and a missing or broken
//! file leaves the editor on its built-in defaults.

use anyhow::{Context, Result};
use formwright_data::QuestionnaireSettings;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::export::ExportFormat;
use crate::slug::{DEFAULT_FALLBACK_PREFIX, SlugCodec};

pub const CONFIG_FILE: &str = "formwright.toml";

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub slug: SlugConfig,
    pub defaults: QuestionnaireDefaults,
    pub export: ExportConfig,
}

/// `[slug]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    /// Prefix for slugs generated from blank titles.
    pub fallback_prefix: String,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
        }
    }
}

/// `[defaults]` table: settings given to newly created questionnaires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionnaireDefaults {
    pub allow_anonymous: bool,
    pub show_progress: bool,
    pub randomize_questions: bool,
}

impl Default for QuestionnaireDefaults {
    fn default() -> Self {
        let settings = QuestionnaireSettings::default();
        Self {
            allow_anonymous: settings.allow_anonymous,
            show_progress: settings.show_progress,
            randomize_questions: settings.randomize_questions,
        }
    }
}

/// `[export]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
}

impl EditorConfig {
    /// Slug codec using the configured fallback prefix.
    pub fn slug_codec(&self) -> SlugCodec {
        SlugCodec::new(&self.slug.fallback_prefix)
    }

    /// Settings for a new questionnaire.
    pub fn settings(&self) -> QuestionnaireSettings {
        QuestionnaireSettings {
            allow_anonymous: self.defaults.allow_anonymous,
            show_progress: self.defaults.show_progress,
            randomize_questions: self.defaults.randomize_questions,
            time_limit: None,
        }
    }
}

/// Load configuration from `path`, falling back to defaults on any error.
///
/// # Logging
/// - `info!` on successful load
/// - `warn!` if the file exists but cannot be read or parsed
pub fn load_config(path: &Path) -> EditorConfig {
    if !path.exists() {
        debug!("no config at '{}', using defaults", path.display());
        return EditorConfig::default();
    }
    match try_load_config(path) {
        Ok(config) => {
            info!("editor config loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load editor config from '{}': {e:#}. Using defaults.",
                path.display()
            );
            EditorConfig::default()
        },
    }
}

/// Attempt to load configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn try_load_config(path: &Path) -> Result<EditorConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config from '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: EditorConfig = toml::from_str(
            r#"
            [slug]
            fallback_prefix = "survey"

            [export]
            format = "ron"
            "#,
        )
        .unwrap();
        assert_eq!(config.slug.fallback_prefix, "survey");
        assert_eq!(config.export.format, ExportFormat::Ron);
        assert_eq!(config.defaults, QuestionnaireDefaults::default());
        assert_eq!(config.slug_codec().fallback_prefix(), "survey");
    }

    #[test]
    fn defaults_feed_new_settings() {
        let mut config = EditorConfig::default();
        config.defaults.randomize_questions = true;
        config.defaults.allow_anonymous = false;
        let settings = config.settings();
        assert!(settings.randomize_questions);
        assert!(!settings.allow_anonymous);
        assert!(settings.show_progress);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn broken_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[slug\nfallback_prefix = ").unwrap();
        assert!(try_load_config(&path).is_err());
        assert_eq!(load_config(&path), EditorConfig::default());
    }
}
