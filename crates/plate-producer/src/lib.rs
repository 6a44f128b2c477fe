//! Production pipeline for cutout plates.
//!
//! Given a source board file, this crate derives top and bottom plate boards
//! from the adhesive layers, generates fabrication outputs (gerbers and
//! drill files) for the source and each plate via `kicad-cli`, and packages
//! every board's outputs into a zip archive.

pub mod archive;
pub mod fab;
pub mod plate;
pub mod produce;

pub use plate::{derive_plate, BOARD_EXTENSION};
pub use produce::{
    produce, ArtifactGenerator, BoardFailure, KicadArtifacts, ProduceOptions, ProduceSummary,
    RELATIVE_OUTPUT_DIR, RELATIVE_STAGING_DIR,
};
