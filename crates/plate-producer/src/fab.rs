//! `kicad-cli` invocation for gerber and drill exports.

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::process::Command;

#[cfg(target_os = "macos")]
mod paths {
    pub(crate) fn kicad_cli() -> String {
        std::env::var("KICAD_CLI")
            .unwrap_or_else(|_| "/Applications/KiCad/KiCad.app/Contents/MacOS/kicad-cli".to_string())
    }
}

#[cfg(target_os = "windows")]
mod paths {
    pub(crate) fn kicad_cli() -> String {
        std::env::var("KICAD_CLI")
            .unwrap_or_else(|_| r"C:\Program Files\KiCad\9.0\bin\kicad-cli.exe".to_string())
    }
}

#[cfg(target_os = "linux")]
mod paths {
    pub(crate) fn kicad_cli() -> String {
        std::env::var("KICAD_CLI").unwrap_or_else(|_| "/usr/bin/kicad-cli".to_string())
    }
}

/// Check if KiCad is installed and return a helpful error if not
pub fn check_kicad_installed() -> Result<()> {
    let kicad_path = paths::kicad_cli();

    if !Path::new(&kicad_path).exists() {
        return Err(anyhow!(
            "KiCad CLI not found at expected location: {}\n\
             Please ensure KiCad is installed. You can download it from https://www.kicad.org/\n\
             If KiCad is installed in a non-standard location, set the KICAD_CLI environment variable.",
            kicad_path
        ));
    }

    match Command::new(&kicad_path).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(anyhow!(
            "KiCad CLI found but failed to execute. Please check your KiCad installation."
        )),
        Err(e) => Err(anyhow!(
            "Failed to execute KiCad CLI at {}: {}\n\
             Please ensure KiCad is properly installed and accessible.",
            kicad_path,
            e
        )),
    }
}

/// Builder for KiCad CLI commands
#[derive(Debug, Default)]
pub struct KiCadCli {
    args: Vec<String>,
}

impl KiCadCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command (e.g. "pcb")
    pub fn command(mut self, cmd: &str) -> Self {
        self.args.push(cmd.to_string());
        self
    }

    /// Add a subcommand (e.g. "export")
    pub fn subcommand(mut self, subcmd: &str) -> Self {
        self.args.push(subcmd.to_string());
        self
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Execute the KiCad CLI command
    pub fn run(self) -> Result<()> {
        check_kicad_installed()?;

        debug!("kicad-cli {}", self.args.join(" "));
        let output = Command::new(paths::kicad_cli())
            .args(&self.args)
            .output()
            .context("Failed to execute kicad-cli")?;

        if !output.status.success() {
            std::io::stderr().write_all(&output.stderr)?;
            anyhow::bail!("kicad-cli execution failed");
        }

        Ok(())
    }
}

/// Layers plotted for every board, plates included. Plates only carry edge
/// cuts, silkscreen and NPTH holes, but plotting a uniform set keeps the
/// archives shaped the same for every board.
pub const GERBER_LAYERS: &str = "F.Cu,B.Cu,F.SilkS,B.SilkS,F.Mask,B.Mask,Edge.Cuts";

/// Export gerbers for `board_path` into `output_dir`. Protel file
/// extensions, 6-digit precision, no X2 attributes.
pub fn export_gerbers(board_path: &Path, output_dir: &Path) -> Result<()> {
    KiCadCli::new()
        .command("pcb")
        .subcommand("export")
        .subcommand("gerbers")
        .arg("--output")
        .arg(output_dir.to_string_lossy())
        .arg("--layers")
        .arg(GERBER_LAYERS)
        .arg("--precision")
        .arg("6")
        .arg("--no-x2")
        .arg(board_path.to_string_lossy())
        .run()
        .context("Failed to generate gerber files")
}

/// Export an excellon drill file for `board_path` into `output_dir`.
/// Decimal zero format, millimetres, alternate oval routing, no map file.
pub fn export_drill(board_path: &Path, output_dir: &Path) -> Result<()> {
    KiCadCli::new()
        .command("pcb")
        .subcommand("export")
        .subcommand("drill")
        .arg("--output")
        .arg(output_dir.to_string_lossy())
        .arg("--format")
        .arg("excellon")
        .arg("--excellon-zeros-format")
        .arg("decimal")
        .arg("--excellon-units")
        .arg("mm")
        .arg("--excellon-oval-format")
        .arg("alternate")
        .arg(board_path.to_string_lossy())
        .run()
        .context("Failed to generate drill files")
}
