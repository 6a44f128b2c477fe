//! Footprint pads.

use crate::geometry::Vec2;
use crate::layer::layer_set_contains;
use plate_sexpr::Sexpr;

/// Pad connection/drill class, from the second element of a `(pad ...)`
/// node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    Smd,
    ThruHole,
    NpThruHole,
    Connect,
}

/// Pad outline shape. Only circles and ovals can become unplated holes;
/// everything else is lumped together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    Circle,
    Oval,
    Other,
}

/// Drill attributes of a pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drill {
    pub oblong: bool,
    pub width: f64,
    pub height: f64,
}

/// A pad inside a footprint. As with [`crate::Graphic`], the raw node is
/// kept for lossless serialization and mutations rewrite it in place.
#[derive(Debug, Clone)]
pub struct Pad {
    node: Sexpr,
    number: String,
    kind: PadKind,
    shape: PadShape,
    at: Vec2,
    rotation: f64,
    size: (f64, f64),
    drill: Option<Drill>,
    layers: Vec<String>,
}

impl Pad {
    /// Build from a `(pad ...)` node. Returns `None` for other tags.
    pub fn from_sexpr(node: &Sexpr) -> Option<Pad> {
        if node.tag()? != "pad" {
            return None;
        }
        let items = node.as_list()?;

        // Pad numbers are quoted strings in modern files but bare numerals
        // in older ones.
        let number = items
            .get(1)
            .and_then(|n| {
                n.as_atom()
                    .map(str::to_string)
                    .or_else(|| n.as_num().map(|v| format!("{v}")))
            })
            .unwrap_or_default();

        let kind = match items.get(2).and_then(Sexpr::as_sym) {
            Some("smd") => PadKind::Smd,
            Some("thru_hole") => PadKind::ThruHole,
            Some("np_thru_hole") => PadKind::NpThruHole,
            _ => PadKind::Connect,
        };

        let shape = match items.get(3).and_then(Sexpr::as_sym) {
            Some("circle") => PadShape::Circle,
            Some("oval") => PadShape::Oval,
            _ => PadShape::Other,
        };

        let (at, rotation) = match node.find_list("at") {
            Some(fields) => (
                Vec2::new(
                    fields.get(1).and_then(Sexpr::as_num).unwrap_or(0.0),
                    fields.get(2).and_then(Sexpr::as_num).unwrap_or(0.0),
                ),
                fields.get(3).and_then(Sexpr::as_num).unwrap_or(0.0),
            ),
            None => (Vec2::default(), 0.0),
        };

        let size = match node.find_list("size") {
            Some(fields) => (
                fields.get(1).and_then(Sexpr::as_num).unwrap_or(0.0),
                fields.get(2).and_then(Sexpr::as_num).unwrap_or(0.0),
            ),
            None => (0.0, 0.0),
        };

        let drill = node.find_list("drill").map(parse_drill);

        let layers = node
            .find_list("layers")
            .map(|fields| {
                fields
                    .iter()
                    .skip(1)
                    .filter_map(Sexpr::as_atom)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Pad {
            node: node.clone(),
            number,
            kind,
            shape,
            at,
            rotation,
            size,
            drill,
            layers,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> PadKind {
        self.kind
    }

    pub fn shape(&self) -> PadShape {
        self.shape
    }

    pub fn position(&self) -> Vec2 {
        self.at
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn drill(&self) -> Option<Drill> {
        self.drill
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn is_on_layer(&self, name: &str) -> bool {
        layer_set_contains(&self.layers, name)
    }

    /// Rotation-safe half-extent of the pad outline, used for footprint
    /// bounding boxes.
    pub fn extent_radius(&self) -> f64 {
        self.size.0.max(self.size.1) / 2.0
    }

    /// Convert this pad into an unplated (NPTH) hole: drill shape mirrors
    /// the pad shape, drill size equals the pad outline size, the layer set
    /// becomes the unplated-hole mask, position is unchanged. The pad also
    /// loses any net association since it no longer carries copper.
    pub fn make_unplated_hole(&mut self) {
        self.kind = PadKind::NpThruHole;
        self.drill = Some(Drill {
            oblong: self.shape == PadShape::Oval,
            width: self.size.0,
            height: self.size.1,
        });
        self.layers = vec!["*.Cu".to_string(), "*.Mask".to_string()];

        if let Some(items) = self.node.as_list_mut() {
            if items.len() > 2 {
                items[2] = Sexpr::symbol("np_thru_hole");
            }
            items.retain(|n| n.tag() != Some("drill") && n.tag() != Some("net"));
        }

        let drill_node = if self.shape == PadShape::Oval {
            Sexpr::list(vec![
                Sexpr::symbol("drill"),
                Sexpr::symbol("oval"),
                Sexpr::num(self.size.0),
                Sexpr::num(self.size.1),
            ])
        } else {
            Sexpr::list(vec![Sexpr::symbol("drill"), Sexpr::num(self.size.0)])
        };
        insert_after(&mut self.node, "size", drill_node);

        if let Some(items) = self.node.find_list_mut("layers") {
            items.truncate(1);
            items.push(Sexpr::string("*.Cu"));
            items.push(Sexpr::string("*.Mask"));
        } else if let Some(items) = self.node.as_list_mut() {
            items.push(Sexpr::list(vec![
                Sexpr::symbol("layers"),
                Sexpr::string("*.Cu"),
                Sexpr::string("*.Mask"),
            ]));
        }
    }

    pub fn node(&self) -> &Sexpr {
        &self.node
    }

    pub fn to_sexpr(&self) -> Sexpr {
        self.node.clone()
    }
}

fn parse_drill(fields: &[Sexpr]) -> Drill {
    // Forms: (drill 1.2), (drill oval 1 2), optionally with (offset ...).
    let oblong = fields.get(1).and_then(Sexpr::as_sym) == Some("oval");
    let nums: Vec<f64> = fields.iter().skip(1).filter_map(Sexpr::as_num).collect();
    let width = nums.first().copied().unwrap_or(0.0);
    let height = nums.get(1).copied().unwrap_or(width);
    Drill {
        oblong,
        width,
        height,
    }
}

/// Insert `node` right after the child tagged `anchor`, or append if the
/// anchor is missing.
fn insert_after(parent: &mut Sexpr, anchor: &str, node: Sexpr) {
    if let Some(items) = parent.as_list_mut() {
        let pos = items.iter().position(|n| n.tag() == Some(anchor));
        match pos {
            Some(i) => items.insert(i + 1, node),
            None => items.push(node),
        }
    }
}
