//! Graphic primitives: board-level drawings (`gr_*` tags) and footprint
//! graphical items (`fp_*` tags) share one representation.

use crate::geometry::{BBox, Vec2};
use plate_sexpr::Sexpr;

/// Shape class of a graphic primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicKind {
    Line,
    Rect,
    Circle,
    Arc,
    Poly,
    Curve,
    Text,
}

/// A graphic primitive. The parsed S-expression node is retained so a copy
/// serializes back with every attribute (stroke, fill, uuid, ...) intact;
/// the typed fields cache what the plate derivation needs to inspect.
#[derive(Debug, Clone)]
pub struct Graphic {
    node: Sexpr,
    kind: GraphicKind,
    layer: String,
}

impl Graphic {
    /// Build from a `gr_*` or `fp_*` node. Returns `None` for tags that are
    /// not graphic primitives.
    pub fn from_sexpr(node: &Sexpr) -> Option<Graphic> {
        let tag = node.tag()?;
        let suffix = tag.strip_prefix("gr_").or_else(|| tag.strip_prefix("fp_"))?;
        let kind = match suffix {
            "line" => GraphicKind::Line,
            "rect" => GraphicKind::Rect,
            "circle" => GraphicKind::Circle,
            "arc" => GraphicKind::Arc,
            "poly" => GraphicKind::Poly,
            "curve" => GraphicKind::Curve,
            "text" | "text_box" => GraphicKind::Text,
            _ => return None,
        };
        let layer = node
            .find_list("layer")
            .and_then(|items| items.get(1))
            .and_then(Sexpr::as_atom)
            .unwrap_or_default()
            .to_string();
        Some(Graphic {
            node: node.clone(),
            kind,
            layer,
        })
    }

    pub fn kind(&self) -> GraphicKind {
        self.kind
    }

    pub fn is_text(&self) -> bool {
        self.kind == GraphicKind::Text
    }

    pub fn is_shape(&self) -> bool {
        !self.is_text()
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn is_on_layer(&self, name: &str) -> bool {
        self.layer == name
    }

    /// Reassign the layer, updating both the cached field and the node.
    pub fn set_layer(&mut self, name: &str) {
        self.layer = name.to_string();
        if let Some(items) = self.node.find_list_mut("layer") {
            items.truncate(1);
            items.push(Sexpr::string(name));
        } else if let Some(items) = self.node.as_list_mut() {
            items.push(Sexpr::list(vec![
                Sexpr::symbol("layer"),
                Sexpr::string(name),
            ]));
        }
    }

    /// Extent of the drawn shape, in the coordinate space the node uses
    /// (board space for `gr_*`, footprint-local for `fp_*`). Arcs and bezier
    /// curves are approximated by the hull of their defining points; text
    /// contributes no extent since it never forms outline geometry.
    pub fn bounding_box(&self) -> BBox {
        let mut bbox = BBox::empty();
        match self.kind {
            GraphicKind::Line | GraphicKind::Rect => {
                for name in ["start", "end"] {
                    if let Some(p) = self.point(name) {
                        bbox.include(p);
                    }
                }
            }
            GraphicKind::Circle => {
                if let (Some(center), Some(end)) = (self.point("center"), self.point("end")) {
                    bbox.include_circle(center, center.distance(end));
                }
            }
            GraphicKind::Arc => {
                for name in ["start", "mid", "end"] {
                    if let Some(p) = self.point(name) {
                        bbox.include(p);
                    }
                }
            }
            GraphicKind::Poly | GraphicKind::Curve => {
                if let Some(pts) = self.node.find_list("pts") {
                    for xy in pts.iter().filter_map(Sexpr::as_list) {
                        if xy.first().and_then(Sexpr::as_sym) != Some("xy") {
                            continue;
                        }
                        if let (Some(x), Some(y)) = (
                            xy.get(1).and_then(Sexpr::as_num),
                            xy.get(2).and_then(Sexpr::as_num),
                        ) {
                            bbox.include(Vec2::new(x, y));
                        }
                    }
                }
            }
            GraphicKind::Text => {}
        }
        bbox
    }

    pub fn node(&self) -> &Sexpr {
        &self.node
    }

    pub fn to_sexpr(&self) -> Sexpr {
        self.node.clone()
    }

    fn point(&self, name: &str) -> Option<Vec2> {
        let items = self.node.find_list(name)?;
        Some(Vec2::new(
            items.get(1)?.as_num()?,
            items.get(2)?.as_num()?,
        ))
    }
}
