use anyhow::Result;
use clap::Args;
use colored::Colorize;
use plate_producer::{produce, KicadArtifacts, ProduceOptions};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProduceArgs {
    /// Path to .kicad_pcb file
    #[arg(value_name = "BOARD", value_hint = clap::ValueHint::FilePath)]
    pub board: PathBuf,

    /// Directory the archives are written to (default: ../../gerbers
    /// relative to the board file)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for plate files and exports, cleared on every run
    /// (default: ../../temp relative to the board file)
    #[arg(long = "staging-dir", value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,
}

pub fn execute(args: ProduceArgs) -> Result<()> {
    let options = ProduceOptions {
        output_dir: args.output_dir,
        staging_dir: args.staging_dir,
    };
    let summary = produce(&args.board, &options, &KicadArtifacts)?;

    for archive in &summary.archives {
        println!("{} {}", "Archived".green().bold(), archive.display());
    }
    for board in &summary.skipped {
        println!("{} {board} (no plate geometry)", "Skipped".yellow().bold());
    }
    for failure in &summary.failures {
        eprintln!(
            "{} {}: {:#}",
            "Failed".red().bold(),
            failure.board,
            failure.error
        );
    }

    if summary.all_failed() {
        anyhow::bail!("no fabrication archives were produced");
    }
    Ok(())
}
