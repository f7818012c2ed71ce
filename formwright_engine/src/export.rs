//! Import and export of questionnaires and rosters.
//!
//! Documents are written as pretty JSON (the format the web builder produced)
//! or RON. Exporting then importing gives back an equal value, slugs included.

use anyhow::{Context, Result};
use formwright_data::{NamedEntity, Questionnaire};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::roster::{Roster, RosterKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Ron,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Ron => "ron",
        }
    }

    /// Format implied by a file's extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ExportFormat::Json),
            "ron" => Some(ExportFormat::Ron),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// On-disk shape of an exported roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    pub kind: RosterKind,
    #[serde(default)]
    pub entries: Vec<NamedEntity>,
}

/// Suggested file name for an exported questionnaire: whitespace runs in the
/// title become underscores.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "questionnaire" } else { stem.as_str() };
    format!("{stem}.{}", format.extension())
}

/// Serialize a questionnaire as pretty text.
///
/// # Errors
/// Serialization failures from serde_json or ron.
pub fn export_questionnaire(questionnaire: &Questionnaire, format: ExportFormat) -> Result<String> {
    to_text(questionnaire, format).with_context(|| format!("exporting questionnaire '{}'", questionnaire.id))
}

/// Parse a questionnaire exported by [`export_questionnaire`].
///
/// # Errors
/// Returns an error if `text` is not a questionnaire in `format`.
pub fn import_questionnaire(text: &str, format: ExportFormat) -> Result<Questionnaire> {
    from_text(text, format).context("importing questionnaire")
}

/// Write a questionnaire to `path`, in the format its extension names (JSON
/// otherwise).
///
/// # Errors
/// Serialization or file write failures.
pub fn write_questionnaire(path: &Path, questionnaire: &Questionnaire) -> Result<()> {
    let format = ExportFormat::from_path(path).unwrap_or_default();
    let text = export_questionnaire(questionnaire, format)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("questionnaire '{}' written to {}", questionnaire.slug, path.display());
    Ok(())
}

/// Read a questionnaire from `path`.
///
/// # Errors
/// File read or parse failures.
pub fn read_questionnaire(path: &Path) -> Result<Questionnaire> {
    let format = ExportFormat::from_path(path).unwrap_or_default();
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let questionnaire =
        import_questionnaire(&text, format).with_context(|| format!("parsing {}", path.display()))?;
    info!(
        "questionnaire '{}' loaded from {} ({} questions)",
        questionnaire.slug,
        path.display(),
        questionnaire.questions.len()
    );
    Ok(questionnaire)
}

/// Serialize a roster's entries, in order.
///
/// # Errors
/// Serialization failures from serde_json or ron.
pub fn export_roster(roster: &Roster, format: ExportFormat) -> Result<String> {
    let file = RosterFile {
        kind: roster.kind(),
        entries: roster.to_vec(),
    };
    to_text(&file, format).with_context(|| format!("exporting {} roster", roster.kind()))
}

/// Parse a roster exported by [`export_roster`].
///
/// # Errors
/// Parse failures, or repeated entry ids.
pub fn import_roster(text: &str, format: ExportFormat) -> Result<Roster> {
    let file: RosterFile = from_text(text, format).context("importing roster")?;
    let kind = file.kind;
    Roster::from_entries(kind, file.entries).with_context(|| format!("importing {kind} roster"))
}

fn to_text<T: Serialize>(value: &T, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Json => serde_json::to_string_pretty(value)?,
        ExportFormat::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())?,
    })
}

fn from_text<T: DeserializeOwned>(text: &str, format: ExportFormat) -> Result<T> {
    Ok(match format {
        ExportFormat::Json => serde_json::from_str(text)?,
        ExportFormat::Ron => ron::from_str(text)?,
    })
}
