// src/loops/assign.rs
//
// Filling a line loop with a sector: existing sidedefs are retargeted
// and missing ones are created, taking care to keep every linedef
// with a valid right side.

use log::debug;

use crate::config::EditorConfig;
use crate::document::{Document, ObjType};
use crate::editor::{delete_objects, flip_linedef_group, EditError};
use crate::hover::closest_line_casting_horiz;
use crate::loops::{trace_line_loop, LineLoop};
use crate::map::{is_real_tex, Side, SideDef, MLF_BLOCKING, MLF_TWO_SIDED};
use crate::selection::Selection;

/// A linedef gaining its second sidedef stops being a solid wall: the
/// two-sided flag goes on, blocking goes off, and the old middle
/// texture migrates onto the upper and lower parts of both sides.
pub fn add_second_sidedef(doc: &Document, ld: usize, new_sd: usize, other_sd: usize) {
    doc.mutate_linedef(ld, |line| {
        line.flags |= MLF_TWO_SIDED;
        line.flags &= !MLF_BLOCKING;
    });

    let other = doc.sidedef(other_sd);

    if is_real_tex(&other.mid_tex) {
        let mid = other.mid_tex.clone();

        doc.mutate_sidedef(new_sd, |sd| {
            sd.lower_tex = mid.clone();
            sd.upper_tex = mid.clone();
        });

        doc.mutate_sidedef(other_sd, |sd| {
            if !is_real_tex(&sd.lower_tex) {
                sd.lower_tex = mid.clone();
            }
            if !is_real_tex(&sd.upper_tex) {
                sd.upper_tex = mid.clone();
            }
            sd.mid_tex = "-".to_string();
        });
    } else {
        doc.mutate_sidedef(new_sd, |sd| {
            sd.lower_tex = other.lower_tex.clone();
            sd.upper_tex = other.upper_tex.clone();
        });
    }
}

fn first_real_tex(sd: &SideDef) -> Option<String> {
    for tex in [&sd.mid_tex, &sd.lower_tex, &sd.upper_tex] {
        if is_real_tex(tex) {
            return Some(tex.clone());
        }
    }
    None
}

// Texture for a sidedef about to be created on edge `k`: take it from
// the nearest edge of the loop that already has one.  Facing sides of
// the loop are preferred over far sides.
fn neighbor_wall_tex(doc: &Document, loop_: &LineLoop, k: usize) -> Option<String> {
    let count = loop_.lines.len();

    for facing_only in [true, false] {
        for dist in 1..count {
            for step in [dist, count - dist] {
                let j = (k + step) % count;
                let line = doc.linedef(loop_.lines[j]);

                let sides: &[Side] = if facing_only {
                    &[loop_.sides[j]]
                } else {
                    &[Side::Right, Side::Left]
                };

                for &s in sides {
                    let sd = line.side_index(s);
                    if sd < 0 {
                        continue;
                    }
                    if let Some(tex) = first_real_tex(&doc.sidedef(sd as usize)) {
                        return Some(tex);
                    }
                }
            }
        }
    }

    None
}

// Update one side of one linedef to reference the sector, creating a
// sidedef when the line has none there.
fn do_assign_sector(
    doc: &Document,
    ld: usize,
    side: Side,
    wall_tex: &str,
    new_sec: usize,
    flip: &mut Selection,
) {
    let line = doc.linedef(ld);

    let sd_num = line.side_index(side);
    let other_sd = line.side_index(side.flipped());

    if sd_num >= 0 {
        doc.set_sidedef_sector(sd_num as usize, new_sec as i32);
        return;
    }

    // adding a LEFT side to a line with no sides at all would create
    // an invalid linedef, so schedule it for flipping instead
    if side == Side::Left && other_sd < 0 {
        flip.set(ld);
    }

    let mut sd = SideDef::default();
    sd.set_defaults(wall_tex, other_sd >= 0);
    sd.sector = new_sec as i32;

    let new_sd = doc.add_sidedef(sd);

    doc.set_linedef_side(ld, side, new_sd as i32);

    // a second side: clear out the middle texture and wall flags
    if other_sd >= 0 {
        add_second_sidedef(doc, ld, new_sd, other_sd as usize);
    }
}

/// Make every facing side of the loop (and of its islands) reference
/// `new_sec`.  Lines that would end up with only a left side are
/// collected in `flip` for the caller to flip afterwards.
pub fn assign_sector_to_loop(
    doc: &Document,
    config: &EditorConfig,
    loop_: &LineLoop,
    new_sec: usize,
    flip: &mut Selection,
) {
    for k in 0..loop_.lines.len() {
        let wall_tex = neighbor_wall_tex(doc, loop_, k)
            .unwrap_or_else(|| config.default_wall_tex.clone());

        do_assign_sector(doc, loop_.lines[k], loop_.sides[k], &wall_tex, new_sec, flip);
    }

    for island in &loop_.islands {
        assign_sector_to_loop(doc, config, island, new_sec, flip);
    }
}

/// Fill the enclosed area around `(map_x, map_y)` with the sector
/// `new_sec`, which must already exist.  With `model_from_neighbor`
/// set, the sector's properties are first copied from the area's
/// longest-bordering neighbor (or reset to defaults when there is
/// none).
pub fn assign_sector_to_space(
    doc: &Document,
    config: &EditorConfig,
    map_x: i32,
    map_y: i32,
    new_sec: usize,
    model_from_neighbor: bool,
) -> Result<(), EditError> {
    let Some((ld, side)) = closest_line_casting_horiz(doc, map_x, map_y) else {
        debug!("area is not closed (can see infinity)");
        return Err(EditError::AreaNotClosed);
    };

    let side = if side < 0 { Side::Left } else { Side::Right };

    let Some(mut loop_) = trace_line_loop(doc, ld, side, false) else {
        debug!("area is not closed (tracing a loop failed)");
        return Err(EditError::AreaNotClosed);
    };

    if loop_.faces_outward {
        debug!("line loop faces outward");
        return Err(EditError::LoopFacesOutward);
    }

    loop_.find_islands(doc);

    if model_from_neighbor {
        match loop_.neighboring_sector(doc) {
            Some(model) if model != new_sec => {
                let model_sec = doc.sector(model);
                doc.mutate_sector(new_sec, |s| *s = (*model_sec).clone());
            }
            Some(_) => {}
            None => {
                doc.mutate_sector(new_sec, |s| {
                    s.set_defaults(
                        &config.default_floor_tex,
                        &config.default_ceiling_tex,
                        config.default_light,
                    )
                });
            }
        }
    }

    let mut flip = Selection::new(ObjType::Linedefs);

    assign_sector_to_loop(doc, config, &loop_, new_sec, &mut flip);

    flip_linedef_group(doc, &flip);

    delete_unused_sectors(doc);

    Ok(())
}

// Retargeting sidedefs can leave the sector they used to face with no
// references at all.
fn delete_unused_sectors(doc: &Document) {
    let mut used = vec![false; doc.num_sectors()];
    {
        let sidedefs = doc.sidedefs.read();
        for sd in sidedefs.iter() {
            if sd.sector >= 0 {
                used[sd.sector as usize] = true;
            }
        }
    }

    let mut unused = Selection::new(ObjType::Sectors);
    for (s, &in_use) in used.iter().enumerate() {
        if !in_use {
            unused.set(s);
        }
    }

    if unused.notempty() {
        debug!("deleting {} unused sectors", unused.count_obj());
        delete_objects(doc, &unused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{LineDef, Sector};

    fn add_sector(doc: &Document) -> usize {
        doc.add_sector(Sector::new(0, 128, "FLAT1".into(), "CEIL1".into(), 160, 0, 0))
    }

    // bare clockwise square: right sides face inward
    fn bare_square(doc: &Document, x: i32, y: i32, size: i32) -> Vec<usize> {
        let a = doc.add_vertex(x, y);
        let b = doc.add_vertex(x, y + size);
        let c = doc.add_vertex(x + size, y + size);
        let d = doc.add_vertex(x + size, y);

        [(a, b), (b, c), (c, d), (d, a)]
            .iter()
            .map(|&(s, e)| doc.add_linedef(LineDef::new(s, e)))
            .collect()
    }

    #[test]
    fn test_fill_bare_square() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let lines = bare_square(&doc, 0, 0, 128);
        let sec = add_sector(&doc);

        assign_sector_to_space(&doc, &config, 64, 64, sec, false).unwrap();

        // every line gained a right sidedef referencing the sector,
        // and stayed one-sided
        for &ld in &lines {
            let line = doc.linedef(ld);
            assert!(line.right >= 0, "line {} has no right side", ld);
            assert_eq!(line.left, -1);
            assert_eq!(doc.sidedef(line.right as usize).sector, sec as i32);
        }
    }

    #[test]
    fn test_fill_counterclockwise_square_flips_lines() {
        let doc = Document::new();
        let config = EditorConfig::default();

        // counterclockwise winding: the inward-facing sides are LEFT
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(128, 0);
        let c = doc.add_vertex(128, 128);
        let d = doc.add_vertex(0, 128);
        for (s, e) in [(a, b), (b, c), (c, d), (d, a)] {
            doc.add_linedef(LineDef::new(s, e));
        }

        let sec = add_sector(&doc);

        assign_sector_to_space(&doc, &config, 64, 64, sec, false).unwrap();

        // lines were flipped so the new sidedef is on the right
        for ld in 0..4 {
            let line = doc.linedef(ld);
            assert!(line.right >= 0);
            assert_eq!(line.left, -1);
            assert_eq!(doc.sidedef(line.right as usize).sector, sec as i32);
        }
    }

    #[test]
    fn test_fill_open_area_fails() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 128);
        doc.add_linedef(LineDef::new(a, b));

        let sec = add_sector(&doc);

        assert_eq!(
            assign_sector_to_space(&doc, &config, 64, 64, sec, false),
            Err(EditError::AreaNotClosed)
        );
    }

    #[test]
    fn test_second_side_migrates_mid_texture() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let lines = bare_square(&doc, 0, 0, 256);

        let sec1 = add_sector(&doc);
        assign_sector_to_space(&doc, &config, 128, 128, sec1, false).unwrap();

        // draw a second square sharing the east wall of the first,
        // using the existing corner vertices
        let east_bottom = 3; // (256, 0)
        let east_top = 2; // (256, 256)
        let e = doc.add_vertex(512, 0);
        let f = doc.add_vertex(512, 256);
        doc.add_linedef(LineDef::new(east_top, f));
        doc.add_linedef(LineDef::new(f, e));
        doc.add_linedef(LineDef::new(e, east_bottom));

        let sec2 = add_sector(&doc);
        assign_sector_to_space(&doc, &config, 384, 128, sec2, false).unwrap();

        // the shared wall is now two sided and unblocked, and its
        // old middle texture moved to the lower/upper parts
        let shared = doc.linedef(lines[2]);
        assert!(shared.two_sided());
        assert!(shared.flags & MLF_TWO_SIDED != 0);
        assert!(shared.flags & MLF_BLOCKING == 0);

        let right = doc.sidedef(shared.right as usize);
        assert_eq!(right.mid_tex, "-");
        assert_eq!(right.lower_tex, config.default_wall_tex);
        assert_eq!(right.upper_tex, config.default_wall_tex);

        let left = doc.sidedef(shared.left as usize);
        assert_eq!(left.sector, sec2 as i32);
        assert_eq!(left.lower_tex, config.default_wall_tex);
        assert_eq!(left.upper_tex, config.default_wall_tex);
    }

    #[test]
    fn test_refill_deletes_unused_sector() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let lines = bare_square(&doc, 0, 0, 128);

        let sec1 = add_sector(&doc);
        assign_sector_to_space(&doc, &config, 64, 64, sec1, false).unwrap();

        // refilling with a different sector leaves the old one with
        // no referencing sidedefs, so it gets deleted
        let sec2 = add_sector(&doc);
        assign_sector_to_space(&doc, &config, 64, 64, sec2, false).unwrap();

        assert_eq!(doc.num_sectors(), 1);
        for &ld in &lines {
            let line = doc.linedef(ld);
            assert_eq!(doc.sidedef(line.right as usize).sector, 0);
        }
    }

    #[test]
    fn test_new_sidedef_texture_inferred_from_neighbor() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let lines = bare_square(&doc, 0, 0, 128);
        let sec = add_sector(&doc);

        // one wall already has a texture that differs from the default
        let sd = doc.add_sidedef(SideDef::new(
            0,
            0,
            "-".into(),
            "-".into(),
            "MARBLE1".into(),
            sec as i32,
        ));
        doc.set_linedef_side(lines[0], Side::Right, sd as i32);

        assign_sector_to_space(&doc, &config, 64, 64, sec, false).unwrap();

        // the synthesized sidedefs picked it up instead of the default
        for &ld in &lines[1..] {
            let line = doc.linedef(ld);
            assert_eq!(doc.sidedef(line.right as usize).mid_tex, "MARBLE1");
        }
    }

    #[test]
    fn test_fill_with_island() {
        let doc = Document::new();
        let config = EditorConfig::default();

        bare_square(&doc, 0, 0, 512);
        let pillar = bare_square(&doc, 224, 224, 64);

        let sec = add_sector(&doc);
        assign_sector_to_space(&doc, &config, 64, 64, sec, false).unwrap();

        // the pillar's outer sides face the new sector too
        for &ld in &pillar {
            let line = doc.linedef(ld);
            // pillar is wound clockwise, so its outward side is LEFT;
            // flipping makes it the right side
            assert!(line.right >= 0);
            assert_eq!(doc.sidedef(line.right as usize).sector, sec as i32);
        }
    }
}
