//! End-to-end production: derive the plates, generate fabrication outputs
//! for every board, package each board's outputs into an archive.

use crate::archive;
use crate::fab;
use crate::plate::derive_plate;
use anyhow::{Context, Result};
use log::{info, warn};
use plate_board::layer::{B_ADHESIVE, F_ADHESIVE};
use plate_board::{Board, BoardError};
use std::fs;
use std::path::{Path, PathBuf};

/// Default archive output directory, relative to the board file's directory.
pub const RELATIVE_OUTPUT_DIR: &str = "../../gerbers";

/// Default staging directory, relative to the board file's directory.
/// Cleared on every run.
pub const RELATIVE_STAGING_DIR: &str = "../../temp";

/// Plates derived from a source board, in production order: the bottom
/// plate comes from the back adhesive layer, the top plate from the front.
const PLATES: &[(&str, &str)] = &[(B_ADHESIVE, "bottom-plate"), (F_ADHESIVE, "top-plate")];

/// Generates fabrication outputs for one board file into a work directory.
///
/// Abstracted so the pipeline can be exercised without a KiCad
/// installation.
pub trait ArtifactGenerator {
    fn generate(&self, board_path: &Path, work_dir: &Path) -> Result<()>;
}

/// Production generator backed by `kicad-cli`: gerbers plus an excellon
/// drill file.
#[derive(Debug, Default)]
pub struct KicadArtifacts;

impl ArtifactGenerator for KicadArtifacts {
    fn generate(&self, board_path: &Path, work_dir: &Path) -> Result<()> {
        fab::export_gerbers(board_path, work_dir)?;
        fab::export_drill(board_path, work_dir)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProduceOptions {
    /// Where the archives land. Defaults to [`RELATIVE_OUTPUT_DIR`].
    pub output_dir: Option<PathBuf>,
    /// Scratch space for plate files and generated outputs. Defaults to
    /// [`RELATIVE_STAGING_DIR`].
    pub staging_dir: Option<PathBuf>,
}

/// What a production run accomplished, board by board.
#[derive(Debug, Default)]
pub struct ProduceSummary {
    pub archives: Vec<PathBuf>,
    pub skipped: Vec<String>,
    pub failures: Vec<BoardFailure>,
}

#[derive(Debug)]
pub struct BoardFailure {
    pub board: String,
    pub error: anyhow::Error,
}

impl ProduceSummary {
    pub fn all_failed(&self) -> bool {
        self.archives.is_empty() && !self.failures.is_empty()
    }
}

/// Run the full pipeline for the board at `board_path`.
///
/// Loads the source board, derives the bottom and top plates into the
/// staging directory, then generates and archives fabrication outputs for
/// the source and each derived plate. A board whose reference layer holds
/// no geometry is skipped, not failed. Generation failures are isolated per
/// board; a missing reference layer in the board's layer table is a fatal
/// error since the board file itself is malformed.
pub fn produce(
    board_path: &Path,
    options: &ProduceOptions,
    artifacts: &dyn ArtifactGenerator,
) -> Result<ProduceSummary> {
    let source = Board::load(board_path)?;

    let board_dir = board_path.parent().unwrap_or_else(|| Path::new("."));
    let staging_dir = options
        .staging_dir
        .clone()
        .unwrap_or_else(|| board_dir.join(RELATIVE_STAGING_DIR));
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| board_dir.join(RELATIVE_OUTPUT_DIR));

    // Staging always starts clean so stale plates from earlier runs cannot
    // leak into the archives.
    if staging_dir.exists() {
        fs::remove_dir_all(&staging_dir)
            .with_context(|| format!("failed to clear {}", staging_dir.display()))?;
    }
    fs::create_dir_all(&staging_dir)
        .with_context(|| format!("failed to create {}", staging_dir.display()))?;
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut summary = ProduceSummary::default();
    let mut boards = vec![source.clone()];

    for (layer, suffix) in PLATES {
        let plate_name = format!("{}-{suffix}", source.name());
        match derive_plate(&source, layer, &staging_dir, suffix) {
            Ok(Some(plate)) => boards.push(plate),
            Ok(None) => {
                info!("{plate_name}: no geometry on {layer}, skipped");
                summary.skipped.push(plate_name);
            }
            Err(err @ BoardError::UnknownLayer { .. }) => return Err(err.into()),
            Err(err) => {
                warn!("{plate_name}: derivation failed: {err}");
                summary.failures.push(BoardFailure {
                    board: plate_name,
                    error: err.into(),
                });
            }
        }
    }

    for board in &boards {
        let name = board.name();
        match generate_and_archive(board.path(), &name, &staging_dir, &output_dir, artifacts) {
            Ok(archive_path) => {
                info!("{name}: archived to {}", archive_path.display());
                summary.archives.push(archive_path);
            }
            Err(error) => {
                warn!("{name}: artifact generation failed: {error:#}");
                summary.failures.push(BoardFailure { board: name, error });
            }
        }
    }

    Ok(summary)
}

fn generate_and_archive(
    board_path: &Path,
    name: &str,
    staging_dir: &Path,
    output_dir: &Path,
    artifacts: &dyn ArtifactGenerator,
) -> Result<PathBuf> {
    let work_dir = staging_dir.join(name);
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("failed to create {}", work_dir.display()))?;
    artifacts.generate(board_path, &work_dir)?;

    let archive_path = output_dir.join(format!("{name}.zip"));
    archive::zip_directory(&work_dir, &archive_path)?;
    Ok(archive_path)
}
