//! Layer names and the per-board layer table.
//!
//! Layer names use KiCad's canonical file-format spellings (`F.SilkS`, not
//! the `F.Silkscreen` alias the UI shows).

use plate_sexpr::Sexpr;

/// The layer whose geometry defines a board's physical outline.
pub const EDGE_CUTS: &str = "Edge.Cuts";
pub const F_SILKSCREEN: &str = "F.SilkS";
pub const B_SILKSCREEN: &str = "B.SilkS";
/// Front adhesive layer, used as the top plate's outline marker.
pub const F_ADHESIVE: &str = "F.Adhes";
/// Back adhesive layer, used as the bottom plate's outline marker.
pub const B_ADHESIVE: &str = "B.Adhes";

/// One row of the board's `(layers ...)` table: `(44 "Edge.Cuts" user)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDef {
    pub id: i32,
    pub name: String,
    pub kind: String,
}

/// The ordered layer table of a board.
#[derive(Debug, Clone, Default)]
pub struct LayerTable {
    defs: Vec<LayerDef>,
}

impl LayerTable {
    /// Parse the items of a `(layers ...)` list.
    pub fn from_sexpr(items: &[Sexpr]) -> Self {
        let mut defs = Vec::new();
        for row in items.iter().skip(1) {
            let Some(fields) = row.as_list() else {
                continue;
            };
            let Some(id) = fields.first().and_then(Sexpr::as_num) else {
                continue;
            };
            let Some(name) = fields.get(1).and_then(Sexpr::as_atom) else {
                continue;
            };
            let kind = fields
                .get(2)
                .and_then(Sexpr::as_sym)
                .unwrap_or("user")
                .to_string();
            defs.push(LayerDef {
                id: id as i32,
                name: name.to_string(),
                kind,
            });
        }
        LayerTable { defs }
    }

    /// Resolve a layer name to its numeric id.
    pub fn id(&self, name: &str) -> Option<i32> {
        self.defs.iter().find(|d| d.name == name).map(|d| d.id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.id(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Wildcard-aware membership test for pad layer sets. KiCad pad layer sets
/// may name layers directly (`F.Cu`) or through wildcards (`*.Cu`,
/// `*.Mask`) that stand for the front and back variant of a layer.
pub fn layer_set_contains(set: &[String], name: &str) -> bool {
    set.iter().any(|entry| {
        if let Some(suffix) = entry.strip_prefix('*') {
            name.ends_with(suffix)
        } else {
            entry == name
        }
    })
}
