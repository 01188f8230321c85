use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{ArgGroup, Parser};
use xlf_populate::GlossaryKind;

#[derive(Parser, Debug)]
#[command(
    name = "xlf-populate",
    version,
    about = "Populate XLIFF <target> elements from a bilingual CSV or DOCX glossary"
)]
#[command(group(ArgGroup::new("glossary").required(true).args(["csv", "docx"])))]
struct Cli {
    /// Source-only XLIFF document (.xlf/.xliff)
    #[arg(short = 'x', long = "xliff")]
    xliff: PathBuf,

    /// Bilingual CSV with columns: source, target
    #[arg(short = 'c', long = "csv")]
    csv: Option<PathBuf>,

    /// Bilingual Word document whose tables have columns: ignored, source, target
    #[arg(short = 'd', long = "docx")]
    docx: Option<PathBuf>,

    /// Output path (default: <input>.updated.xlf next to the input)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Copy the source's inline tags into each target
    #[arg(short = 'p', long = "preserve-tags")]
    preserve_tags: bool,

    /// Accept near-miss matches
    #[arg(short = 'f', long = "fuzzy")]
    fuzzy: bool,

    /// Minimum similarity for fuzzy matches, between 0 and 1 (default: 0.85)
    #[arg(long = "fuzzy-cutoff")]
    fuzzy_cutoff: Option<f64>,

    /// Print a preview of unmatched segments
    #[arg(long = "preview")]
    preview: bool,

    /// Write run statistics as JSON to this file
    #[arg(long = "report-json")]
    report_json: Option<PathBuf>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "settings")]
    settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    xlf_populate::logging::init(cli.verbose)?;

    let (glossary, glossary_kind) = match (cli.csv, cli.docx) {
        (Some(path), _) => (path, GlossaryKind::Csv),
        (None, Some(path)) => (path, GlossaryKind::Docx),
        (None, None) => return Err(anyhow!("either --csv or --docx is required")),
    };

    let output = xlf_populate::run(xlf_populate::Config {
        xliff: cli.xliff,
        glossary,
        glossary_kind: Some(glossary_kind),
        output: cli.output,
        settings_path: cli.settings,
        preserve_tags: cli.preserve_tags,
        fuzzy: cli.fuzzy,
        fuzzy_cutoff: cli.fuzzy_cutoff,
        preview: cli.preview,
        report_json: cli.report_json,
    })?;

    println!("{}", output.summary);
    println!("Wrote {}", output.output_path.display());
    Ok(())
}
