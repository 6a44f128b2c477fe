//! Plate derivation: turn a source board plus a reference layer into a
//! cutout plate board.
//!
//! A plate is a physical template (top or bottom stiffening plate) whose
//! outline is whatever was drawn on the reference layer. Everything
//! electrically meaningful is discarded; mounting holes and logo footprints
//! are carried over whole, other footprints are reduced to unplated holes
//! and edge-cut graphics.

use log::{debug, info};
use plate_board::layer::{B_SILKSCREEN, EDGE_CUTS, F_SILKSCREEN};
use plate_board::{Board, BoardError, FootprintCategory, PadShape};
use std::path::Path;

/// File extension of board files.
pub const BOARD_EXTENSION: &str = "kicad_pcb";

/// Derive a plate board from `source`, using the shapes on
/// `reference_layer` as the plate outline.
///
/// Returns `Ok(None)` when the reference layer carries no outline geometry;
/// that is a normal outcome, not an error. The plate file is written under
/// `staging_dir` as `<source-name>-<suffix>.kicad_pcb` before returning.
///
/// The source board is never modified: every entity placed on the plate is
/// an independently owned copy.
pub fn derive_plate(
    source: &Board,
    reference_layer: &str,
    staging_dir: &Path,
    suffix: &str,
) -> Result<Option<Board>, BoardError> {
    // The reference layer set is fixed at the call sites; a name the board
    // cannot resolve means the configuration is wrong, and surfaces here.
    source.layer_id(reference_layer)?;

    let plate_path = staging_dir.join(format!("{}-{suffix}.{BOARD_EXTENSION}", source.name()));
    let mut plate = source.derive(plate_path);

    // Reference-layer shapes become the plate outline; board-level
    // silkscreen text is carried over as-is. Everything else is dropped.
    for drawing in source.drawings() {
        if drawing.is_shape() && drawing.is_on_layer(reference_layer) {
            let mut copy = drawing.clone();
            copy.set_layer(EDGE_CUTS);
            plate.add_drawing(copy);
        } else if drawing.is_text()
            && (drawing.is_on_layer(F_SILKSCREEN) || drawing.is_on_layer(B_SILKSCREEN))
        {
            plate.add_drawing(drawing.clone());
        }
    }

    let outline = plate.edges_bounding_box();
    if outline.area() == 0.0 {
        debug!(
            "{}: no outline geometry on {reference_layer}, no {suffix} produced",
            source.name()
        );
        return Ok(None);
    }

    for footprint in source.footprints() {
        if !footprint.bounding_box().intersects(&outline) {
            continue;
        }
        let mut copy = footprint.clone();
        match copy.category {
            FootprintCategory::PreservedWhole => {
                debug!("{}: keeping {} whole", source.name(), copy.reference);
                plate.add_footprint(copy);
            }
            FootprintCategory::Ordinary => {
                // Circle/oval pads on the reference layer become unplated
                // holes; reference-layer graphics become edge cuts; nothing
                // else survives.
                copy.pads.retain_mut(|pad| {
                    let eligible = pad.is_on_layer(reference_layer)
                        && matches!(pad.shape(), PadShape::Circle | PadShape::Oval);
                    if eligible {
                        pad.make_unplated_hole();
                    }
                    eligible
                });
                copy.graphics.retain_mut(|graphic| {
                    let keep = graphic.is_on_layer(reference_layer);
                    if keep {
                        graphic.set_layer(EDGE_CUTS);
                    }
                    keep
                });
                if copy.is_empty() {
                    debug!(
                        "{}: {} has no plate content, dropped",
                        source.name(),
                        copy.reference
                    );
                } else {
                    plate.add_footprint(copy);
                }
            }
        }
    }

    plate.save()?;
    info!(
        "{}: derived {suffix} with {} drawings, {} footprints",
        source.name(),
        plate.drawings().len(),
        plate.footprints().len()
    );
    Ok(Some(plate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_board::layer::{B_ADHESIVE, F_ADHESIVE};
    use plate_board::PadKind;

    /// A board with the standard layer table, a 40x30 outline, and whatever
    /// extra nodes the test injects.
    fn board(extra: &str) -> Board {
        let text = format!(
            r#"(kicad_pcb
                (version 20221018)
                (generator pcbnew)
                (general (thickness 1.6))
                (layers
                    (0 "F.Cu" signal)
                    (31 "B.Cu" signal)
                    (32 "B.Adhes" user)
                    (33 "F.Adhes" user)
                    (36 "B.SilkS" user)
                    (37 "F.SilkS" user)
                    (44 "Edge.Cuts" user)
                )
                (setup (pad_to_mask_clearance 0))
                (gr_rect (start 0 0) (end 40 30) (layer "Edge.Cuts"))
                {extra}
            )"#
        );
        Board::parse(&text, "demo.kicad_pcb").unwrap()
    }

    fn staging() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn no_reference_geometry_yields_no_plate() {
        let source = board("");
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate").unwrap();
        assert!(plate.is_none());
        // Nothing persisted either.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn degenerate_outline_yields_no_plate() {
        // A single horizontal line has a bounding box with zero area.
        let source = board(r#"(gr_line (start 5 5) (end 35 5) (layer "F.Adhes"))"#);
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate").unwrap();
        assert!(plate.is_none());
    }

    #[test]
    fn unknown_reference_layer_is_fatal() {
        let source = board("");
        let dir = staging();
        let err = derive_plate(&source, "F.Adhesive", dir.path(), "top-plate").unwrap_err();
        assert!(matches!(err, BoardError::UnknownLayer { .. }));
    }

    #[test]
    fn outline_shapes_are_remapped_and_silk_text_kept() {
        let source = board(
            r#"(gr_rect (start 5 5) (end 35 25) (layer "F.Adhes"))
               (gr_line (start 0 0) (end 10 10) (layer "B.Adhes"))
               (gr_text "board name" (at 20 15) (layer "F.SilkS"))
               (gr_text "internal" (at 20 15) (layer "F.Cu"))"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        // The F.Adhes rect (remapped) and the silkscreen text; the B.Adhes
        // shape and non-silkscreen text are excluded.
        assert_eq!(plate.drawings().len(), 2);
        assert!(plate.drawings()[0].is_on_layer(EDGE_CUTS));
        assert!(plate.drawings()[1].is_text());
        assert!(plate.drawings()[1].is_on_layer(F_SILKSCREEN));
        assert_eq!(plate.edges_bounding_box().area(), 30.0 * 20.0);
    }

    #[test]
    fn source_board_is_untouched() {
        let source = board(r#"(gr_rect (start 5 5) (end 35 25) (layer "F.Adhes"))"#);
        let dir = staging();
        derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate").unwrap();
        assert!(source.drawings()[1].is_on_layer(F_ADHESIVE));
    }

    #[test]
    fn preserved_whole_footprint_is_copied_unchanged() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 40 30) (layer "F.Adhes"))
               (footprint "MountingHole:M3"
                   (layer "F.Cu")
                   (at 8 8)
                   (property "Reference" "H1" (at 0 -3) (layer "F.SilkS"))
                   (fp_circle (center 0 0) (end 2.5 0) (layer "F.SilkS"))
                   (pad "" np_thru_hole circle (at 0 0) (size 3.2 3.2) (drill 3.2) (layers "*.Cu" "*.Mask"))
                   (pad "" np_thru_hole circle (at 5 0) (size 3.2 3.2) (drill 3.2) (layers "*.Cu" "*.Mask"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        assert_eq!(plate.footprints().len(), 1);
        let fp = &plate.footprints()[0];
        assert_eq!(fp.reference, "H1");
        assert_eq!(fp.pads.len(), 2);
        assert_eq!(fp.graphics.len(), 1);
        // Untouched: the silkscreen circle keeps its layer.
        assert!(fp.graphics[0].is_on_layer(F_SILKSCREEN));
    }

    #[test]
    fn footprint_outside_outline_is_excluded() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 20 20) (layer "F.Adhes"))
               (footprint "MountingHole:M3"
                   (layer "F.Cu")
                   (at 10 10)
                   (property "Reference" "H1" (at 0 -3) (layer "F.SilkS"))
                   (pad "" np_thru_hole circle (at 0 0) (size 3.2 3.2) (drill 3.2) (layers "*.Cu" "*.Mask"))
               )
               (footprint "Resistor_SMD:R_0603"
                   (layer "F.Cu")
                   (at 100 100)
                   (property "Reference" "R1" (at 0 -2) (layer "F.SilkS"))
                   (pad "1" smd rect (at -0.8 0) (size 0.8 0.9) (layers "F.Cu" "F.Paste" "F.Mask"))
                   (pad "2" smd rect (at 0.8 0) (size 0.8 0.9) (layers "F.Cu" "F.Paste" "F.Mask"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        assert_eq!(plate.footprints().len(), 1);
        assert_eq!(plate.footprints()[0].reference, "H1");
    }

    #[test]
    fn straddling_ordinary_footprint_keeps_only_converted_pads() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 20 20) (layer "F.Adhes"))
               (footprint "Custom:Clip"
                   (layer "F.Cu")
                   (at 20 10)
                   (property "Reference" "MK1" (at 0 -4) (layer "F.SilkS"))
                   (pad "1" smd circle (at -2 0) (size 2 2) (layers "F.Adhes"))
                   (pad "2" smd rect (at 4 0) (size 1.5 1.5) (layers "F.Cu" "F.Mask"))
                   (fp_line (start -2 -2) (end 2 2) (layer "F.Adhes"))
                   (fp_line (start 0 0) (end 1 1) (layer "F.SilkS"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        assert_eq!(plate.footprints().len(), 1);
        let fp = &plate.footprints()[0];
        assert_eq!(fp.pads.len(), 1);
        assert_eq!(fp.pads[0].number(), "1");
        assert_eq!(fp.pads[0].kind(), PadKind::NpThruHole);
        let drill = fp.pads[0].drill().unwrap();
        assert!(!drill.oblong);
        assert_eq!(drill.width, 2.0);
        // Only the reference-layer line survives, remapped to edge cuts.
        assert_eq!(fp.graphics.len(), 1);
        assert!(fp.graphics[0].is_on_layer(EDGE_CUTS));
    }

    #[test]
    fn oval_pads_convert_to_oblong_drills() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 40 30) (layer "B.Adhes"))
               (footprint "Custom:Slot"
                   (layer "B.Cu")
                   (at 10 10)
                   (property "Reference" "MK2" (at 0 -4) (layer "B.SilkS"))
                   (pad "1" smd oval (at 0 0) (size 2 4) (layers "B.Adhes"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, B_ADHESIVE, dir.path(), "bottom-plate")
            .unwrap()
            .unwrap();

        let drill = plate.footprints()[0].pads[0].drill().unwrap();
        assert!(drill.oblong);
        assert_eq!((drill.width, drill.height), (2.0, 4.0));
    }

    #[test]
    fn emptied_ordinary_footprint_is_discarded() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 40 30) (layer "F.Adhes"))
               (footprint "Resistor_SMD:R_0603"
                   (layer "F.Cu")
                   (at 10 10)
                   (property "Reference" "R1" (at 0 -2) (layer "F.SilkS"))
                   (pad "1" smd rect (at -0.8 0) (size 0.8 0.9) (layers "F.Cu" "F.Paste" "F.Mask"))
                   (fp_line (start 0 0) (end 1 1) (layer "F.SilkS"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();
        assert!(plate.footprints().is_empty());
    }

    #[test]
    fn reference_layer_pad_with_other_shape_is_removed() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 40 30) (layer "F.Adhes"))
               (footprint "Custom:Clip"
                   (layer "F.Cu")
                   (at 10 10)
                   (property "Reference" "MK1" (at 0 -4) (layer "F.SilkS"))
                   (pad "1" smd rect (at 0 0) (size 2 2) (layers "F.Adhes"))
                   (pad "2" smd circle (at 3 0) (size 2 2) (layers "F.Adhes"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        let fp = &plate.footprints()[0];
        assert_eq!(fp.pads.len(), 1);
        assert_eq!(fp.pads[0].number(), "2");
    }

    #[test]
    fn no_copper_bearing_item_survives_on_ordinary_footprints() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 40 30) (layer "F.Adhes"))
               (footprint "Custom:Clip"
                   (layer "F.Cu")
                   (at 10 10)
                   (property "Reference" "MK1" (at 0 -4) (layer "F.SilkS"))
                   (pad "1" smd circle (at 0 0) (size 2 2) (layers "F.Adhes"))
                   (pad "2" thru_hole circle (at 4 0) (size 1.7 1.7) (drill 1) (layers "*.Cu" "*.Mask"))
                   (fp_line (start -1 0) (end 1 0) (layer "F.Adhes"))
               )"#,
        );
        let dir = staging();
        let plate = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        for fp in plate.footprints() {
            for pad in &fp.pads {
                assert_eq!(pad.kind(), PadKind::NpThruHole);
                assert_eq!(pad.layers(), ["*.Cu", "*.Mask"]);
            }
            for graphic in &fp.graphics {
                assert!(graphic.is_on_layer(EDGE_CUTS));
            }
        }
    }

    #[test]
    fn plate_file_is_persisted() {
        let source = board(r#"(gr_rect (start 5 5) (end 35 25) (layer "F.Adhes"))"#);
        let dir = staging();
        derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        let plate_path = dir.path().join("demo-top-plate.kicad_pcb");
        assert!(plate_path.exists());
        let reloaded = Board::load(&plate_path).unwrap();
        assert_eq!(reloaded.drawings().len(), 1);
        assert_eq!(reloaded.edges_bounding_box().area(), 30.0 * 20.0);
    }

    #[test]
    fn derivation_is_idempotent() {
        let source = board(
            r#"(gr_rect (start 0 0) (end 40 30) (layer "F.Adhes"))
               (footprint "MountingHole:M3"
                   (layer "F.Cu")
                   (at 8 8)
                   (property "Reference" "H1" (at 0 -3) (layer "F.SilkS"))
                   (pad "" np_thru_hole circle (at 0 0) (size 3.2 3.2) (drill 3.2) (layers "*.Cu" "*.Mask"))
               )
               (footprint "Custom:Clip"
                   (layer "F.Cu")
                   (at 20 10)
                   (property "Reference" "MK1" (at 0 -4) (layer "F.SilkS"))
                   (pad "1" smd circle (at 0 0) (size 2 2) (layers "F.Adhes"))
               )"#,
        );
        let dir = staging();
        let first = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();
        let second = derive_plate(&source, F_ADHESIVE, dir.path(), "top-plate")
            .unwrap()
            .unwrap();

        assert_eq!(first.to_sexpr().to_string(), second.to_sexpr().to_string());
    }
}
