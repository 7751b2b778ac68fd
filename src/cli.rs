//! Command-line tool for saved annotation documents.

use annotkit_editor::{serialization, svg_export, Document, ShapeKind};
use annotkit_settings::{default_config_path, EditorConfig};
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "annotkit")]
#[command(version, about = "Inspect and export AnnotKit annotation documents")]
pub struct Cli {
    /// Editor configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check that a document loads and is internally consistent.
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Render the visible layers of a document to SVG.
    ExportSvg {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output path (defaults to FILE with an .svg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a machine-readable summary of a document.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the effective editor configuration as TOML.
    Config,
}

/// Summary printed by `annotkit info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub image_width: u32,
    pub image_height: u32,
    pub annotation_count: usize,
    pub kinds: BTreeMap<String, usize>,
    pub layers: Vec<LayerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    pub id: u64,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub annotations: usize,
}

impl DocumentInfo {
    pub fn from_document(doc: &Document) -> Self {
        let mut kinds = BTreeMap::new();
        for annotation in doc.annotations() {
            *kinds.entry(kind_name(annotation.kind())).or_insert(0) += 1;
        }
        Self {
            image_width: doc.image_width(),
            image_height: doc.image_height(),
            annotation_count: doc.annotation_count(),
            kinds,
            layers: doc
                .layers()
                .iter()
                .map(|layer| LayerInfo {
                    id: layer.id.0,
                    name: layer.name.clone(),
                    visible: layer.visible,
                    locked: layer.locked,
                    annotations: layer.annotation_count(),
                })
                .collect(),
        }
    }
}

fn kind_name(kind: ShapeKind) -> String {
    kind.to_string().to_lowercase()
}

/// Parse `args` (program name first) and run the selected command, writing
/// its report to stdout.
pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_output(args, &mut out)
}

/// [`run`] with an explicit output sink.
pub fn run_with_output<I, T>(args: I, out: &mut dyn Write) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(out, "{}", err)?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    match cli.command {
        Commands::Validate { file } => run_validate(&file, out),
        Commands::ExportSvg { file, output } => run_export_svg(&file, output.as_deref(), out),
        Commands::Info { file } => run_info(&file, out),
        Commands::Config => run_config(cli.config.as_deref(), out),
    }
}

/// Load the editor configuration from `path`, or from the platform config
/// directory (falling back to defaults) when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => EditorConfig::load_or_default().context("Failed to load editor config"),
    }
}

fn run_validate(file: &Path, out: &mut dyn Write) -> Result<()> {
    let doc = serialization::load_from_file(file)?;
    writeln!(
        out,
        "{}: OK ({} layer(s), {} annotation(s))",
        file.display(),
        doc.layer_count(),
        doc.annotation_count()
    )?;
    Ok(())
}

fn run_export_svg(file: &Path, output: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let doc = serialization::load_from_file(file)?;
    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.with_extension("svg"));
    svg_export::export_to_file(&doc, &target)
        .with_context(|| format!("Failed to export {}", file.display()))?;
    info!("Exported {} to {}", file.display(), target.display());
    writeln!(out, "{}", target.display())?;
    Ok(())
}

fn run_config(path: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let config = load_config(path)?;
    let source = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    let content = toml::to_string_pretty(&config).context("Failed to encode config")?;
    writeln!(out, "# {}", source.display())?;
    write!(out, "{}", content)?;
    Ok(())
}

fn run_info(file: &Path, out: &mut dyn Write) -> Result<()> {
    let doc = serialization::load_from_file(file)?;
    let summary = DocumentInfo::from_document(&doc);
    let json = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
    writeln!(out, "{}", json)?;
    Ok(())
}
