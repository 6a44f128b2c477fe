//! Board loading, construction and saving.

use crate::footprint::Footprint;
use crate::geometry::BBox;
use crate::graphic::Graphic;
use crate::layer::{self, LayerTable};
use crate::BoardError;
use log::{debug, trace};
use plate_sexpr::{formatter, Sexpr};
use std::fs;
use std::path::{Path, PathBuf};

/// A board: file identity, header sections, ordered drawings and ordered
/// footprints.
///
/// Loaded boards keep their header nodes (`version`, `generator`,
/// `general`, `paper`, `layers`, `setup`) verbatim. A board derived with
/// [`Board::derive`] starts empty but shares the source's header, so both
/// resolve the same layer names and a saved plate opens in KiCad with the
/// source's stackup intact.
#[derive(Debug, Clone)]
pub struct Board {
    path: PathBuf,
    header: Vec<Sexpr>,
    layers: LayerTable,
    drawings: Vec<Graphic>,
    footprints: Vec<Footprint>,
}

/// Header tags carried over from the source file, in file order.
const HEADER_TAGS: &[&str] = &[
    "version",
    "generator",
    "generator_version",
    "general",
    "paper",
    "page",
    "layers",
    "setup",
];

impl Board {
    /// Load a `.kicad_pcb` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Board, BoardError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| BoardError::Read {
            path: path.clone(),
            source,
        })?;
        Board::parse(&text, path)
    }

    /// Parse board text with an explicit file identity.
    pub fn parse(text: &str, path: impl Into<PathBuf>) -> Result<Board, BoardError> {
        let path = path.into();
        let doc = plate_sexpr::parse(text).map_err(|source| BoardError::Parse {
            path: path.clone(),
            source,
        })?;
        let items = match doc.as_list() {
            Some(items) if items.first().and_then(Sexpr::as_sym) == Some("kicad_pcb") => items,
            _ => return Err(BoardError::NotABoard { path }),
        };

        let mut header = Vec::new();
        let mut layers = LayerTable::default();
        let mut drawings = Vec::new();
        let mut footprints = Vec::new();

        for node in items.iter().skip(1) {
            match node.tag() {
                Some(tag) if HEADER_TAGS.contains(&tag) => {
                    if tag == "layers" {
                        layers = LayerTable::from_sexpr(node.as_list().unwrap_or_default());
                    }
                    header.push(node.clone());
                }
                Some("footprint") | Some("module") => {
                    if let Some(fp) = Footprint::from_sexpr(node) {
                        footprints.push(fp);
                    }
                }
                Some(tag) => match Graphic::from_sexpr(node) {
                    Some(graphic) => drawings.push(graphic),
                    // Tracks, zones, vias, nets: electrically meaningful,
                    // not modelled.
                    None => trace!("skipping ({tag} ...) node in {}", path.display()),
                },
                None => {}
            }
        }

        debug!(
            "loaded {}: {} drawings, {} footprints, {} layers",
            path.display(),
            drawings.len(),
            footprints.len(),
            layers.len()
        );

        Ok(Board {
            path,
            header,
            layers,
            drawings,
            footprints,
        })
    }

    /// Create an empty board with a new file identity, inheriting this
    /// board's header and layer table.
    pub fn derive(&self, path: impl Into<PathBuf>) -> Board {
        Board {
            path: path.into(),
            header: self.header.clone(),
            layers: self.layers.clone(),
            drawings: Vec::new(),
            footprints: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without the `.kicad_pcb` extension.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// Resolve a layer name to its id. An unresolvable name is a contract
    /// violation: the caller asked for a layer this board does not define.
    pub fn layer_id(&self, name: &str) -> Result<i32, BoardError> {
        self.layers.id(name).ok_or_else(|| BoardError::UnknownLayer {
            name: name.to_string(),
        })
    }

    pub fn drawings(&self) -> &[Graphic] {
        &self.drawings
    }

    pub fn add_drawing(&mut self, drawing: Graphic) {
        self.drawings.push(drawing);
    }

    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    pub fn add_footprint(&mut self, footprint: Footprint) {
        self.footprints.push(footprint);
    }

    /// Bounding box of the board outline: every shape drawn on `Edge.Cuts`,
    /// both board-level drawings and footprint graphics. Zero area means no
    /// outline geometry is present.
    pub fn edges_bounding_box(&self) -> BBox {
        let mut bbox = BBox::empty();
        for drawing in &self.drawings {
            if drawing.is_shape() && drawing.is_on_layer(layer::EDGE_CUTS) {
                bbox.merge(&drawing.bounding_box());
            }
        }
        for fp in &self.footprints {
            for graphic in &fp.graphics {
                if graphic.is_shape() && graphic.is_on_layer(layer::EDGE_CUTS) {
                    for corner in graphic.bounding_box().corners() {
                        bbox.include(fp.position() + corner.rotated_deg(fp.rotation()));
                    }
                }
            }
        }
        bbox
    }

    /// Serialize as a `kicad_pcb` document.
    pub fn to_sexpr(&self) -> Sexpr {
        let mut items = vec![Sexpr::symbol("kicad_pcb")];
        items.extend(self.header.iter().cloned());
        // A board file needs the null net for pads to reference.
        items.push(Sexpr::list(vec![
            Sexpr::symbol("net"),
            Sexpr::num(0.0),
            Sexpr::string(""),
        ]));
        items.extend(self.drawings.iter().map(Graphic::to_sexpr));
        items.extend(self.footprints.iter().map(Footprint::to_sexpr));
        Sexpr::list(items)
    }

    /// Write the board to its file identity.
    pub fn save(&self) -> Result<(), BoardError> {
        let text = formatter::format_board(&self.to_sexpr());
        fs::write(&self.path, text).map_err(|source| BoardError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("saved {}", self.path.display());
        Ok(())
    }
}
