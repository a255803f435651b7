// Batch pipeline
// load -> reconcile -> reports / matrices / figures -> charge diagrams -> manifest

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ringscan_config::{ConfigError, Settings};
use ringscan_io::csv::{load_library_file, write_matrix_csv};
use ringscan_io::report::write_summary_csv;
use ringscan_io::{ensure_dir, prepare_charge_dir, ArtifactKind, IoError, RunManifest};
use ringscan_recon::engine::mirrored_cell_count;
use ringscan_recon::{
    build_charge_table, reconcile, reconcile_oriented, summarize, ChargeTable, Library,
    ReconError, ReconciledMatrix, Ring,
};
use ringscan_render::{render_figure, DiagramRenderer, RenderError};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Io(IoError),
    Recon(ReconError),
    Render(RenderError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Recon(e) => write!(f, "{e}"),
            Self::Render(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Recon(e) => Some(e),
            Self::Render(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Recon(inner) => Self::Recon(inner),
            other => Self::Io(other),
        }
    }
}

impl From<ReconError> for PipelineError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

impl From<RenderError> for PipelineError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

// ============================================================================
// Stages shared by run and check
// ============================================================================

fn load(settings: &Settings) -> Result<Library, PipelineError> {
    let path = &settings.input.path;
    let library = load_library_file(path, &settings.schema, settings.delimiter())?;
    log::info!(
        "{}: {} records, {} rejected",
        path.display(),
        library.records.len(),
        library.rejected.len()
    );
    Ok(library)
}

/// Reconcile every schema quantity, then every derived quantity.
fn reconcile_all(
    settings: &Settings,
    library: &Library,
) -> Result<BTreeMap<String, ReconciledMatrix>, PipelineError> {
    let mut matrices = BTreeMap::new();
    for quantity in &settings.schema.quantities {
        let matrix = reconcile(&library.records, quantity)?;
        log::info!(
            "{}: {}x{} matrix, baseline {}, {} cells mirrored",
            quantity.key,
            matrix.len(),
            matrix.len(),
            matrix.baseline(),
            mirrored_cell_count(&library.records, &quantity.column_a)
        );
        matrices.insert(quantity.key.clone(), matrix);
    }

    for derived in &settings.derived {
        // validate() guarantees both operands are schema quantities
        let (Some(minuend), Some(subtrahend)) =
            (matrices.get(&derived.minuend), matrices.get(&derived.subtrahend))
        else {
            return Err(ConfigError::Validation(format!(
                "derived '{}': operand not reconciled",
                derived.key
            ))
            .into());
        };
        let matrix = minuend.zip_with(subtrahend, derived.name.as_str(), |a, b| a - b)?;
        log::info!("{}: {} - {}", derived.key, derived.minuend, derived.subtrahend);
        matrices.insert(derived.key.clone(), matrix);
    }

    Ok(matrices)
}

fn charge_table(settings: &Settings, library: &Library) -> Result<ChargeTable, PipelineError> {
    let table = build_charge_table(&library.records, &settings.schema.charges)?;
    log::info!(
        "charge table: {} rows, {} rejected",
        table.len(),
        table.rejected.len()
    );
    Ok(table)
}

// ============================================================================
// check
// ============================================================================

/// What a dry run found. Nothing is written.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub records: usize,
    pub rejected: usize,
    pub substituents: usize,
    pub quantities: Vec<String>,
    pub charge_rows: usize,
}

/// Load and reconcile everything a run would, without writing outputs.
pub fn check(settings: &Settings) -> Result<CheckReport, PipelineError> {
    let library = load(settings)?;
    let matrices = reconcile_all(settings, &library)?;
    let table = charge_table(settings, &library)?;
    Ok(CheckReport {
        records: library.records.len(),
        rejected: library.rejected.len() + table.rejected.len(),
        substituents: matrices.values().next().map_or(0, ReconciledMatrix::len),
        quantities: matrices.keys().cloned().collect(),
        charge_rows: table.len(),
    })
}

// ============================================================================
// run
// ============================================================================

/// Execute a full batch run. Returns the manifest and where it was written.
pub fn run(settings: &Settings) -> Result<(RunManifest, PathBuf), PipelineError> {
    let out = &settings.output;
    ensure_dir(&out.directory)?;
    prepare_charge_dir(&out.charge_dir(), out.charge_dir_policy)?;

    let mut manifest = RunManifest::new(&settings.input.path)?;
    let library = load(settings)?;
    let matrices = reconcile_all(settings, &library)?;

    for report in &settings.reports {
        let matrix = lookup(&matrices, &report.quantity)?;
        let (distal, proximal) = summarize(matrix);
        let path = out.path(&report.file);
        write_summary_csv(&path, &report.mean_header, &distal, &proximal)?;
        log::info!("wrote {}", path.display());
        manifest.record(ArtifactKind::Summary, path);
    }

    if let Some(dir) = &out.matrix_dir {
        let dir = out.path(dir);
        write_matrices(settings, &library, &matrices, &dir, &mut manifest)?;
    }

    if !settings.figures.is_empty() || !settings.diagrams.styles.is_empty() {
        ringscan_render::register_fonts(&settings.fonts)?;
    }

    for figure in &settings.figures {
        let path = out.path(&figure.file);
        render_figure(&path, figure, &matrices)?;
        log::info!("wrote {}", path.display());
        manifest.record(ArtifactKind::Figure, path);
    }

    let table = charge_table(settings, &library)?;
    if !settings.diagrams.styles.is_empty() {
        let renderer = DiagramRenderer::new(&settings.diagrams)?;
        for path in renderer.render_all(&table, &out.charge_dir())? {
            manifest.record(ArtifactKind::ChargeDiagram, path);
        }
    }

    manifest.counts.records = library.records.len();
    manifest.counts.rejected = library.rejected.len() + table.rejected.len();
    manifest.counts.substituents = matrices.values().next().map_or(0, ReconciledMatrix::len);
    manifest.counts.quantities = matrices.len();
    manifest.counts.charge_rows = table.len();
    manifest.rejected = library.rejected;
    manifest.rejected.extend(table.rejected);

    let manifest_path = out.path(&out.manifest);
    manifest.write(&manifest_path)?;
    log::info!(
        "run complete: {} artifacts, manifest {}",
        manifest.artifacts.len(),
        manifest_path.display()
    );
    Ok((manifest, manifest_path))
}

fn lookup<'a>(
    matrices: &'a BTreeMap<String, ReconciledMatrix>,
    key: &str,
) -> Result<&'a ReconciledMatrix, PipelineError> {
    matrices
        .get(key)
        .ok_or_else(|| ConfigError::Validation(format!("unknown quantity '{key}'")).into())
}

/// `<key>.csv` for the A view of every matrix, `<key>_b.csv` for the B view
/// of every schema quantity.
fn write_matrices(
    settings: &Settings,
    library: &Library,
    matrices: &BTreeMap<String, ReconciledMatrix>,
    dir: &Path,
    manifest: &mut RunManifest,
) -> Result<(), PipelineError> {
    ensure_dir(dir)?;
    for (key, matrix) in matrices {
        let path = dir.join(format!("{key}.csv"));
        write_matrix_csv(&path, matrix)?;
        manifest.record(ArtifactKind::Matrix, path);
    }
    for quantity in &settings.schema.quantities {
        let b_view = reconcile_oriented(&library.records, quantity, Ring::B)?;
        let path = dir.join(format!("{}_b.csv", quantity.key));
        write_matrix_csv(&path, &b_view)?;
        manifest.record(ArtifactKind::Matrix, path);
    }
    log::info!("wrote {} matrices to {}", matrices.len() + settings.schema.quantities.len(), dir.display());
    Ok(())
}
