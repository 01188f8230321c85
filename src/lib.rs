use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod apply;
mod error;
pub mod glossary;
pub mod logging;
pub mod mapping;
pub mod markup;
pub mod matcher;
pub mod report;
pub mod settings;
pub mod text;
pub mod xml;

pub use apply::{ApplyOptions, RunStats, apply};
pub use error::Error;
pub use glossary::GlossaryKind;
pub use mapping::TranslationMapping;
pub use matcher::{Cutoff, MatchResult};
pub use xml::Document;

#[derive(Debug, Clone)]
pub struct Config {
    pub xliff: PathBuf,
    pub glossary: PathBuf,
    pub glossary_kind: Option<GlossaryKind>,
    pub output: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
    pub preserve_tags: bool,
    pub fuzzy: bool,
    pub fuzzy_cutoff: Option<f64>,
    pub preview: bool,
    pub report_json: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub output_path: PathBuf,
    pub mapping_entries: usize,
    pub stats: RunStats,
    /// Human-readable summary for stdout.
    pub summary: String,
}

/// Parses `xliff`, fills in targets from `mapping` and returns the serialized result.
///
/// Nothing is produced when the document is not well-formed.
pub fn populate(
    xliff: &[u8],
    mapping: &TranslationMapping,
    options: &ApplyOptions,
) -> Result<(RunStats, Vec<u8>), Error> {
    let mut document = Document::parse(xliff)?;
    let stats = apply(&mut document, mapping, options);
    let bytes = document
        .to_pretty_bytes()
        .map_err(|err| Error::io("<serialized document>", err))?;
    Ok((stats, bytes))
}

pub fn run(config: Config) -> Result<RunOutput> {
    let mut settings = settings::load_settings(config.settings_path.as_deref())?;
    settings.preserve_tags |= config.preserve_tags;
    settings.fuzzy |= config.fuzzy;
    settings.preview |= config.preview;
    if let Some(cutoff) = config.fuzzy_cutoff {
        settings.fuzzy_cutoff = cutoff;
    }
    let options = settings.apply_options()?;

    let kind = config
        .glossary_kind
        .or_else(|| GlossaryKind::from_path(&config.glossary))
        .ok_or_else(|| {
            anyhow!(
                "cannot tell glossary format of {}; use --csv or --docx",
                config.glossary.display()
            )
        })?;
    let mapping = glossary::load_mapping(&config.glossary, kind)
        .with_context(|| "failed to build translation mapping")?;
    info!(entries = mapping.len(), "loaded glossary");

    let input = fs::read(&config.xliff)
        .with_context(|| format!("failed to read xliff: {}", config.xliff.display()))?;
    let (stats, bytes) = populate(&input, &mapping, &options)
        .with_context(|| format!("failed to process {}", config.xliff.display()))?;

    let output_path = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&config.xliff));
    write_atomically(&output_path, &bytes)?;

    if let Some(path) = config.report_json.as_deref() {
        let report = report::RunReport::new(mapping.len(), &stats);
        let json = report.to_json().with_context(|| "failed to encode report")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
    }

    let mut lines = vec![format!("Mapping entries found: {}", mapping.len())];
    if settings.preview {
        lines.push(report::render_preview(
            &stats,
            settings.preview_limit,
            settings.preview_width,
        ));
    } else {
        lines.push(format!(
            "Inserted/updated {} <target> elements.",
            stats.inserted
        ));
    }

    Ok(RunOutput {
        output_path,
        mapping_entries: mapping.len(),
        stats,
        summary: lines.join("\n"),
    })
}

/// `<stem>.updated.xlf` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}.updated.xlf", stem))
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("failed to write output: {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("failed to write output: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/tmp/strings.xlf")),
            PathBuf::from("/tmp/strings.updated.xlf")
        );
        assert_eq!(
            default_output_path(Path::new("strings.xliff")),
            PathBuf::from("strings.updated.xlf")
        );
    }

    #[test]
    fn populate_aborts_on_malformed_xml() {
        let mapping = TranslationMapping::default();
        let err = populate(b"<xliff><file></xliff>", &mapping, &ApplyOptions::default())
            .expect_err("malformed");
        assert!(err.is_parse_error());
    }
}
