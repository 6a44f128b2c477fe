//! Footprint placements.

use crate::geometry::{BBox, Vec2};
use crate::graphic::Graphic;
use crate::pad::Pad;
use plate_sexpr::Sexpr;
use regex::Regex;
use std::sync::OnceLock;

/// How plate derivation treats a footprint, decided once at parse time from
/// its reference designator. Mounting holes (`H1`, `H2`, ...) and logo
/// graphics (`LOGO1`, ...) are copied into plates whole; everything else is
/// filtered pad by pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintCategory {
    Ordinary,
    PreservedWhole,
}

fn preserved_whole_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(H|LOGO)\d+$").expect("invalid designator pattern"))
}

impl FootprintCategory {
    /// Classify a reference designator.
    pub fn of(reference: &str) -> FootprintCategory {
        if preserved_whole_pattern().is_match(reference) {
            FootprintCategory::PreservedWhole
        } else {
            FootprintCategory::Ordinary
        }
    }
}

/// A named, positioned footprint: ordered pads, ordered graphical items,
/// and the remaining child nodes (properties, attributes, 3D models, ...)
/// preserved verbatim for serialization.
///
/// Reference and value text fields are kept in the verbatim set, not among
/// the graphical items, mirroring how KiCad separates fields from a
/// footprint's drawn items.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub lib_id: String,
    pub reference: String,
    pub category: FootprintCategory,
    pub layer: String,
    pub pads: Vec<Pad>,
    pub graphics: Vec<Graphic>,
    at: Vec2,
    rotation: f64,
    rest: Vec<Sexpr>,
}

impl Footprint {
    /// Build from a `(footprint ...)` node (or legacy `(module ...)`).
    pub fn from_sexpr(node: &Sexpr) -> Option<Footprint> {
        let tag = node.tag()?;
        if tag != "footprint" && tag != "module" {
            return None;
        }
        let items = node.as_list()?;

        let lib_id = items
            .get(1)
            .and_then(Sexpr::as_atom)
            .unwrap_or_default()
            .to_string();

        let mut reference = String::new();
        let mut layer = String::new();
        let mut at = Vec2::default();
        let mut rotation = 0.0;
        let mut pads = Vec::new();
        let mut graphics = Vec::new();
        let mut rest = Vec::new();

        let body_start = if items.get(1).map(|n| n.as_list().is_none()).unwrap_or(false) {
            2
        } else {
            1
        };

        for child in &items[body_start.min(items.len())..] {
            match child.tag() {
                Some("layer") => {
                    layer = child
                        .as_list()
                        .and_then(|l| l.get(1))
                        .and_then(Sexpr::as_atom)
                        .unwrap_or_default()
                        .to_string();
                }
                Some("at") => {
                    if let Some(fields) = child.as_list() {
                        at = Vec2::new(
                            fields.get(1).and_then(Sexpr::as_num).unwrap_or(0.0),
                            fields.get(2).and_then(Sexpr::as_num).unwrap_or(0.0),
                        );
                        rotation = fields.get(3).and_then(Sexpr::as_num).unwrap_or(0.0);
                    }
                }
                Some("pad") => match Pad::from_sexpr(child) {
                    Some(pad) => pads.push(pad),
                    None => rest.push(child.clone()),
                },
                Some("property") => {
                    if let Some(fields) = child.as_list() {
                        if fields.get(1).and_then(Sexpr::as_str) == Some("Reference") {
                            if let Some(value) = fields.get(2).and_then(Sexpr::as_str) {
                                reference = value.to_string();
                            }
                        }
                    }
                    rest.push(child.clone());
                }
                Some("fp_text")
                    if matches!(
                        child.as_list().and_then(|l| l.get(1)).and_then(Sexpr::as_sym),
                        Some("reference") | Some("value")
                    ) =>
                {
                    if let Some(fields) = child.as_list() {
                        if fields.get(1).and_then(Sexpr::as_sym) == Some("reference") {
                            if let Some(value) = fields.get(2).and_then(Sexpr::as_atom) {
                                reference = value.to_string();
                            }
                        }
                    }
                    rest.push(child.clone());
                }
                _ => match Graphic::from_sexpr(child) {
                    Some(graphic) => graphics.push(graphic),
                    None => rest.push(child.clone()),
                },
            }
        }

        let category = FootprintCategory::of(&reference);

        Some(Footprint {
            lib_id,
            reference,
            category,
            layer,
            pads,
            graphics,
            at,
            rotation,
            rest,
        })
    }

    pub fn position(&self) -> Vec2 {
        self.at
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Board-space bounding box over pad outlines and drawn graphics.
    /// Pads contribute a rotation-safe disc; graphic extents are rotated
    /// with the footprint. Text fields are not counted.
    pub fn bounding_box(&self) -> BBox {
        let mut bbox = BBox::empty();
        for pad in &self.pads {
            let center = self.at + pad.position().rotated_deg(self.rotation);
            bbox.include_circle(center, pad.extent_radius());
        }
        for graphic in &self.graphics {
            for corner in graphic.bounding_box().corners() {
                bbox.include(self.at + corner.rotated_deg(self.rotation));
            }
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty() && self.graphics.is_empty()
    }

    pub fn to_sexpr(&self) -> Sexpr {
        let mut items = vec![Sexpr::symbol("footprint"), Sexpr::string(&self.lib_id)];
        items.push(Sexpr::list(vec![
            Sexpr::symbol("layer"),
            Sexpr::string(&self.layer),
        ]));
        let mut at = vec![
            Sexpr::symbol("at"),
            Sexpr::num(self.at.x),
            Sexpr::num(self.at.y),
        ];
        if self.rotation != 0.0 {
            at.push(Sexpr::num(self.rotation));
        }
        items.push(Sexpr::list(at));
        items.extend(self.rest.iter().cloned());
        items.extend(self.graphics.iter().map(Graphic::to_sexpr));
        items.extend(self.pads.iter().map(Pad::to_sexpr));
        Sexpr::list(items)
    }
}
