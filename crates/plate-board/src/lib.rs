//! Structural model of a KiCad board file.
//!
//! [`Board`] owns ordered collections of board-level [`Graphic`] drawings and
//! [`Footprint`] placements, plus the layer table needed to resolve layer
//! names. Entities keep their parsed S-expression node alongside the typed
//! fields, so a board assembled from clones of another board's entities
//! serializes back to valid KiCad text with nothing lost.
//!
//! Electrical content (tracks, zones, vias, net definitions) is deliberately
//! not modelled; this crate exists to support deriving cutout plates, which
//! discard all of it.

mod board;
mod footprint;
pub mod geometry;
mod graphic;
pub mod layer;
mod pad;

pub use board::Board;
pub use footprint::{Footprint, FootprintCategory};
pub use geometry::{BBox, Vec2};
pub use graphic::{Graphic, GraphicKind};
pub use layer::LayerTable;
pub use pad::{Drill, Pad, PadKind, PadShape};

use std::path::PathBuf;
use thiserror::Error;

/// Error types for board loading, saving and layer resolution.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: plate_sexpr::ParseError,
    },

    #[error("{} is not a kicad_pcb document", path.display())]
    NotABoard { path: PathBuf },

    #[error("layer {name:?} does not exist on this board")]
    UnknownLayer { name: String },
}
