use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use plate_board::layer::{B_ADHESIVE, F_ADHESIVE};
use plate_board::Board;
use plate_producer::derive_plate;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Path to .kicad_pcb file
    #[arg(value_name = "BOARD", value_hint = clap::ValueHint::FilePath)]
    pub board: PathBuf,

    /// Directory the plate files are written to (default: the board's
    /// directory)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

pub fn execute(args: DeriveArgs) -> Result<()> {
    let source = Board::load(&args.board)?;

    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => args
            .board
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut derived = 0;
    for (layer, suffix) in [(B_ADHESIVE, "bottom-plate"), (F_ADHESIVE, "top-plate")] {
        match derive_plate(&source, layer, &output_dir, suffix)? {
            Some(plate) => {
                derived += 1;
                println!("{} {}", "Created".green().bold(), plate.path().display());
            }
            None => println!(
                "{} {suffix} (nothing on {layer})",
                "Skipped".yellow().bold()
            ),
        }
    }

    if derived == 0 {
        println!("No plate geometry found on {B_ADHESIVE} or {F_ADHESIVE}");
    }
    Ok(())
}
