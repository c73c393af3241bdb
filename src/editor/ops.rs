// src/editor/ops.rs
//
// Structural editing operations: creating, deleting, splitting,
// merging and joining map objects, with the bookkeeping needed to
// keep the cross-references valid afterwards.

use log::debug;

use crate::config::EditorConfig;
use crate::document::{Document, ObjType};
use crate::geom::{angle_between_points, line_touches_box};
use crate::hover::{find_crossing_points, nearest_sector};
use crate::loops::{assign_sector_to_loop, trace_line_loop};
use crate::map::{LineDef, Sector, Side, SideDef};
use crate::selection::Selection;

// New sectors copy their properties from a model sector when one is
// available, otherwise they take the configured defaults.
fn add_modeled_sector(doc: &Document, config: &EditorConfig, model: Option<usize>) -> usize {
    let sec = match model {
        Some(m) => (*doc.sector(m)).clone(),
        None => {
            let mut s = Sector::new(0, 0, String::new(), String::new(), 0, 0, 0);
            s.set_defaults(
                &config.default_floor_tex,
                &config.default_ceiling_tex,
                config.default_light,
            );
            s
        }
    };
    doc.add_sector(sec)
}

/// Deletes the selected objects, processing numbers from highest to
/// lowest since each deletion renumbers everything above it.
/// Dependents are removed too: deleting a vertex takes its linedefs,
/// deleting a linedef takes its sidedefs, deleting a sector takes
/// the sidedefs referencing it.
pub fn delete_objects(doc: &Document, list: &Selection) {
    if list.empty() {
        return;
    }

    let mut objnums = list.to_vec();
    objnums.sort_unstable();

    for &num in objnums.iter().rev() {
        match list.obj_type() {
            ObjType::Things => doc.delete_thing(num),
            ObjType::Vertices => delete_vertex_with_lines(doc, num),
            ObjType::Linedefs => delete_linedef_with_sides(doc, num),
            ObjType::Sidedefs => doc.delete_sidedef(num),
            ObjType::Sectors => delete_sector_with_sides(doc, num),
        }
    }
}

fn delete_linedef_with_sides(doc: &Document, ld: usize) {
    let line = doc.linedef(ld);

    let mut sides: Vec<i32> = [line.right, line.left]
        .into_iter()
        .filter(|&sd| sd >= 0)
        .collect();
    sides.sort_unstable();

    doc.delete_linedef(ld);

    for &sd in sides.iter().rev() {
        doc.delete_sidedef(sd as usize);
    }
}

fn delete_vertex_with_lines(doc: &Document, v: usize) {
    let mut lines: Vec<usize> = {
        let linedefs = doc.linedefs.read();
        linedefs
            .iter()
            .enumerate()
            .filter(|(_, l)| l.uses_vertex(v))
            .map(|(n, _)| n)
            .collect()
    };
    lines.sort_unstable();

    for &ld in lines.iter().rev() {
        delete_linedef_with_sides(doc, ld);
    }

    doc.delete_vertex(v);
}

fn delete_sector_with_sides(doc: &Document, sec: usize) {
    let mut sides: Vec<usize> = {
        let sidedefs = doc.sidedefs.read();
        sidedefs
            .iter()
            .enumerate()
            .filter(|(_, sd)| sd.sector == sec as i32)
            .map(|(n, _)| n)
            .collect()
    };
    sides.sort_unstable();

    for &sd in sides.iter().rev() {
        doc.delete_sidedef(sd);
    }

    doc.delete_sector(sec);
}

/// Swap the two directions of a linedef, and with them its sidedefs.
pub fn flip_linedef(doc: &Document, ld: usize) {
    doc.mutate_linedef(ld, |line| {
        std::mem::swap(&mut line.start, &mut line.end);
        std::mem::swap(&mut line.right, &mut line.left);
    });
    doc.on_linedef_side_changed();
}

pub fn flip_linedef_group(doc: &Document, flip: &Selection) {
    for ld in flip.iter() {
        flip_linedef(doc, ld);
    }
}

/// Split a linedef at an existing vertex, returning the new linedef
/// (the half from the vertex to the old end).  Sidedefs are
/// duplicated and their X offsets adjusted so wall textures stay put.
pub fn split_linedef_at_vertex(doc: &Document, ld: usize, new_v: usize) -> usize {
    let line = doc.linedef(ld);
    let v = doc.vertex(new_v);

    let orig_length = doc.calc_length(&line) as i32;

    let start = doc.vertex(line.start);
    let new_length =
        (((start.raw_x - v.raw_x) as f64).hypot((start.raw_y - v.raw_y) as f64)) as i32;

    let mut second = (*line).clone();
    second.start = new_v;

    doc.mutate_linedef(ld, |l| l.end = new_v);

    if line.right >= 0 {
        let mut sd = (*doc.sidedef(line.right as usize)).clone();
        sd.x_offset += new_length;
        second.right = doc.add_sidedef(sd) as i32;
    }

    if line.left >= 0 {
        let sd = (*doc.sidedef(line.left as usize)).clone();
        second.left = doc.add_sidedef(sd) as i32;

        // the first half's left side now begins at the new vertex
        doc.mutate_sidedef(line.left as usize, |s| {
            s.x_offset += orig_length - new_length;
        });
    }

    doc.add_linedef(second)
}

/// Redirect every linedef using `v1` to use `v2` instead, removing
/// lines that the merge would make redundant (a line between the two
/// vertices, or one that would exactly overlap another).
pub fn merge_vertex(doc: &Document, v1: usize, v2: usize, v1_will_be_deleted: bool) {
    assert!(v1 != v2);

    // check if two linedefs would overlap after the merge
    for n in (0..doc.num_linedefs()).rev() {
        let line = doc.linedef(n);

        if !line.uses_vertex(v1) {
            continue;
        }

        let v3 = if line.start == v1 { line.end } else { line.start };

        let overlap = (0..doc.num_linedefs()).rev().find(|&k| {
            if k == n {
                return false;
            }
            let other = doc.linedef(k);
            (other.start == v3 && other.end == v2) || (other.start == v2 && other.end == v3)
        });

        if overlap.is_some() {
            delete_linedef_with_sides(doc, n);
        }
    }

    // update remaining linedefs to use v2
    for n in (0..doc.num_linedefs()).rev() {
        let line = doc.linedef(n);

        // a line between the two vertices collapses to nothing
        if (line.start == v1 && line.end == v2) || (line.start == v2 && line.end == v1) {
            if !v1_will_be_deleted {
                delete_linedef_with_sides(doc, n);
            }
            // otherwise deleting v1 will take this line with it
            continue;
        }

        if line.start == v1 {
            doc.mutate_linedef(n, |l| l.start = v2);
        }
        if line.end == v1 {
            doc.mutate_linedef(n, |l| l.end = v2);
        }
    }

    doc.on_linedef_side_changed();
}

/// Pull one vertex apart: every linedef touching it except the last
/// gets its own copy of the vertex, nudged a few units along the
/// line so the copies are visibly separate.
pub fn disconnect_vertex(doc: &Document, v_num: usize) {
    let num_lines = doc.vertex_how_many_linedefs(v_num);
    if num_lines < 2 {
        return;
    }

    let mut which = 0;

    for n in 0..doc.num_linedefs() {
        let line = doc.linedef(n);

        if !line.uses_vertex(v_num) {
            continue;
        }

        let (new_x, new_y) = calc_disconnect_coord(doc, &line, v_num);

        // the last linedef keeps the existing vertex
        if which != num_lines - 1 {
            let new_v = doc.add_vertex(new_x, new_y);

            if line.start == v_num {
                doc.mutate_linedef(n, |l| l.start = new_v);
            } else {
                doc.mutate_linedef(n, |l| l.end = new_v);
            }
        } else {
            doc.move_vertex(v_num, new_x, new_y);
        }

        which += 1;
    }

    doc.on_vertex_moved();
}

fn calc_disconnect_coord(doc: &Document, line: &LineDef, v_num: usize) -> (i32, i32) {
    let (x1, y1, x2, y2) = doc.line_coords(line);

    let mut dx = x2 - x1;
    let mut dy = y2 - y1;

    if line.end == v_num {
        dx = -dx;
        dy = -dy;
    }

    if dx.abs() < 4 && dy.abs() < 4 {
        dx /= 2;
        dy /= 2;
    } else if dx.abs() < 16 && dy.abs() < 16 {
        dx /= 4;
        dy /= 4;
    } else if dx.abs() >= dy.abs() {
        dy = dy * 8 / dx.abs();
        dx = if dx < 0 { -8 } else { 8 };
    } else {
        dx = dx * 8 / dy.abs();
        dy = if dy < 0 { -8 } else { 8 };
    }

    let v = doc.vertex(v_num);
    (v.raw_x + dx, v.raw_y + dy)
}

pub fn linedef_already_exists(doc: &Document, v1: usize, v2: usize) -> bool {
    let linedefs = doc.linedefs.read();
    linedefs.iter().any(|l| {
        (l.start == v1 && l.end == v2) || (l.start == v2 && l.end == v1)
    })
}

/// Does the linedef touch (or cross into) the axis-aligned box?
pub fn linedef_touches_box(doc: &Document, ld: usize, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
    let line = doc.linedef(ld);
    let (lx0, ly0, lx1, ly1) = doc.line_coords(&line);
    line_touches_box(lx0, ly0, lx1, ly1, x0, y0, x1, y1)
}

/// Create a free-standing square sector at `(x, y)`, copying its
/// properties from `model` when given.  Returns the new sector.
pub fn create_square_sector(
    doc: &Document,
    config: &EditorConfig,
    x: i32,
    y: i32,
    model: Option<usize>,
) -> usize {
    let new_sec = add_modeled_sector(doc, config, model);

    let x2 = x + config.new_sector_size;
    let y2 = y + config.new_sector_size;

    let mut first_v = 0;

    for i in 0..4 {
        let vx = if i >= 2 { x2 } else { x };
        let vy = if i == 1 || i == 2 { y2 } else { y };

        let new_v = doc.add_vertex(vx, vy);
        if i == 0 {
            first_v = new_v;
        }

        let mut sd = SideDef::default();
        sd.set_defaults(&config.default_wall_tex, false);
        sd.sector = new_sec as i32;
        let new_sd = doc.add_sidedef(sd);

        let mut line = LineDef::new(new_v, if i == 3 { first_v } else { new_v + 1 });
        line.right = new_sd as i32;
        doc.add_linedef(line);
    }

    new_sec
}

// The simple closed-loop case: the final vertex joins exactly one
// other line, so the new line either completes a fresh loop or closes
// nothing at all.
fn closed_loop_simple(doc: &Document, config: &EditorConfig, new_ld: usize, flip: &mut Selection) {
    let mut right_loop = trace_line_loop(doc, new_ld, Side::Right, false);
    let mut left_loop = trace_line_loop(doc, new_ld, Side::Left, false);

    // require all lines to be bare (no sidedefs)
    if !right_loop.as_ref().map_or(false, |l| l.all_bare(doc)) {
        right_loop = None;
    }
    if !left_loop.as_ref().map_or(false, |l| l.all_bare(doc)) {
        left_loop = None;
    }

    // an outward loop is an island: make it part of the surrounding
    // sector instead of putting a new sector inside it
    let mut did_outer = false;

    for loop_ in [right_loop.as_ref(), left_loop.as_ref()].into_iter().flatten() {
        if loop_.faces_outward {
            if let Some(sec_num) = loop_.faces_sector(doc) {
                assign_sector_to_loop(doc, config, loop_, sec_num, flip);
                did_outer = true;
            }
        }
    }

    // otherwise create a new sector in the inside area
    for loop_ in [right_loop, left_loop].into_iter().flatten() {
        if loop_.faces_outward {
            continue;
        }

        let mut loop_ = loop_;
        loop_.find_islands(doc);

        // when the new loop lies inside an existing sector, we only
        // HAVE to create the inner sector if we surrounded something
        if config.new_islands_are_void && did_outer && loop_.islands.is_empty() {
            return;
        }

        let new_sec = add_modeled_sector(doc, config, loop_.neighboring_sector(doc));

        assign_sector_to_loop(doc, config, &loop_, new_sec, flip);
    }
}

// Find the two linedefs neighboring the new line at its final vertex:
// the tightest turn on the right side and on the left side.
fn two_neighboring_linedefs(
    doc: &Document,
    new_ld: usize,
    v1: usize,
    v2: usize,
) -> Option<(usize, Side, usize, Side)> {
    let mut right_ld: Option<(usize, Side)> = None;
    let mut left_ld: Option<(usize, Side)> = None;

    let mut best_angle1 = 9999.0;
    let mut best_angle2 = -9999.0;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    for (n, line) in linedefs.iter().enumerate() {
        if n == new_ld {
            continue;
        }

        let other_v = if line.start == v2 {
            line.end
        } else if line.end == v2 {
            line.start
        } else {
            continue;
        };

        let a = &vertices[v1];
        let b = &vertices[v2];
        let c = &vertices[other_v];

        let angle = angle_between_points(a.raw_x, a.raw_y, b.raw_x, b.raw_y, c.raw_x, c.raw_y);

        // overlapping lines
        if angle.abs() < 0.0001 {
            return None;
        }

        if angle < best_angle1 {
            let side = if other_v == line.start {
                Side::Left
            } else {
                Side::Right
            };
            right_ld = Some((n, side));
            best_angle1 = angle;
        }

        if angle > best_angle2 {
            let side = if other_v == line.start {
                Side::Right
            } else {
                Side::Left
            };
            left_ld = Some((n, side));
            best_angle2 = angle;
        }
    }

    let (r_ld, r_side) = right_ld?;
    let (l_ld, l_side) = left_ld?;

    if r_ld == l_ld {
        return None;
    }

    Some((r_ld, r_side, l_ld, l_side))
}

// The complex case: the final vertex already joins other lines, so
// the new line may split an existing sector, split a void area, or
// extend the map.
fn closed_loop_complex(
    doc: &Document,
    config: &EditorConfig,
    new_ld: usize,
    v1: usize,
    v2: usize,
    flip: &mut Selection,
) {
    let Some((right_ld, right_side, left_ld, left_side)) =
        two_neighboring_linedefs(doc, new_ld, v1, v2)
    else {
        return;
    };

    let right_front = doc.what_sector(right_ld, right_side);
    let left_front = doc.what_sector(left_ld, left_side);

    let right_back = doc.what_sector(right_ld, right_side.flipped());
    let left_back = doc.what_sector(left_ld, left_side.flipped());

    let right_new = right_front < 0 && right_back < 0;
    let left_new = left_front < 0 && left_back < 0;

    if !(right_new || left_new) && right_front != left_front {
        // broken geometry: no automatic sectoring
        debug!("new line joins mismatched sectors {} / {}", right_front, left_front);
        return;
    }

    // from here we are either splitting a sector or extending one

    let right_loop = trace_line_loop(doc, new_ld, Side::Right, false);
    let left_loop = trace_line_loop(doc, new_ld, Side::Left, false);

    let right_inward = right_loop.as_ref().map_or(false, |l| !l.faces_outward);
    let left_inward = left_loop.as_ref().map_or(false, |l| !l.faces_outward);

    if right_front >= 0 && right_front == left_front && right_inward && left_inward {
        // the SPLITTING case
        debug!("splitting sector #{}", right_front);

        // ensure the original sector is a sane loop
        let Some(orig_loop) = trace_line_loop(doc, right_ld, right_side, true) else {
            return;
        };
        if orig_loop.same_sector(doc).is_none() {
            return;
        }

        let (Some(right_loop), Some(left_loop)) = (right_loop, left_loop) else {
            return;
        };

        // the smaller half gets the new sector
        let right_total = right_loop.total_length(doc);
        let left_total = left_loop.total_length(doc);

        let (mut mod_loop, keep_loop) = if left_total < right_total {
            (left_loop, right_loop)
        } else {
            (right_loop, left_loop)
        };

        mod_loop.find_islands(doc);

        let new_sec = add_modeled_sector(doc, config, Some(right_front as usize));

        assign_sector_to_loop(doc, config, &keep_loop, right_front as usize, flip);
        assign_sector_to_loop(doc, config, &mod_loop, new_sec, flip);

        return;
    }

    if right_inward && right_front < 0 && left_inward && left_front < 0 {
        // the SPLIT-VOID case
        debug!("splitting void area");

        let (Some(right_loop), Some(left_loop)) = (right_loop, left_loop) else {
            return;
        };

        let right_total = right_loop.total_length(doc);
        let left_total = left_loop.total_length(doc);

        let (mut loop_, model) = if left_total < right_total {
            (left_loop, left_back)
        } else {
            (right_loop, right_back)
        };

        loop_.find_islands(doc);

        let new_sec = add_modeled_sector(
            doc,
            config,
            if model >= 0 { Some(model as usize) } else { None },
        );

        assign_sector_to_loop(doc, config, &loop_, new_sec, flip);
        return;
    }

    // the EXTENDING case
    debug!("extending the map");

    for (loop_, front) in [(right_loop, right_front), (left_loop, left_front)] {
        let Some(mut loop_) = loop_ else { continue };

        if loop_.faces_outward {
            // extending an island: see whether it lies inside an
            // existing sector
            let sec_num = if front >= 0 {
                Some(front as usize)
            } else {
                loop_.faces_sector(doc)
            };

            if let Some(sec_num) = sec_num {
                assign_sector_to_loop(doc, config, &loop_, sec_num, flip);
            }
        } else {
            loop_.find_islands(doc);

            let new_sec = add_modeled_sector(doc, config, loop_.neighboring_sector(doc));

            assign_sector_to_loop(doc, config, &loop_, new_sec, flip);
        }
    }
}

/// Insert a linedef between two existing vertices.  Unless `no_fill`
/// is set, any loop the new line closes is given a sector: a fresh
/// loop becomes a new sector, a line across an existing sector splits
/// it in two.  Returns the new linedef.
pub fn insert_linedef(
    doc: &Document,
    config: &EditorConfig,
    v1: usize,
    v2: usize,
    no_fill: bool,
) -> usize {
    let new_ld = doc.add_linedef(LineDef::new(v1, v2));

    if no_fill {
        return new_ld;
    }

    let mut flip = Selection::new(ObjType::Linedefs);

    // the count includes the line just added
    match doc.vertex_how_many_linedefs(v2) {
        0 | 1 => {
            // joined onto an isolated vertex: nothing to close
        }
        2 => closed_loop_simple(doc, config, new_ld, &mut flip),
        _ => closed_loop_complex(doc, config, new_ld, v1, v2, &mut flip),
    }

    flip_linedef_group(doc, &flip);

    new_ld
}

/// Like [`insert_linedef`], but splitting any linedef the new line
/// would cross, and passing through any vertex it would sit on.  The
/// insertion proceeds piecewise, recursively.
pub fn insert_linedef_autosplit(
    doc: &Document,
    config: &EditorConfig,
    v1: usize,
    v2: usize,
    no_fill: bool,
    scale: f64,
) {
    if linedef_already_exists(doc, v1, v2) {
        return;
    }

    let va = doc.vertex(v1);
    let vb = doc.vertex(v2);

    let cross = find_crossing_points(
        doc,
        va.raw_x,
        va.raw_y,
        Some(v1),
        vb.raw_x,
        vb.raw_y,
        Some(v2),
        scale,
    );

    let Some(closest) = cross.points.first() else {
        insert_linedef(doc, config, v1, v2, no_fill);
        return;
    };

    let mid_v = if closest.ld >= 0 {
        let new_v = doc.add_vertex(closest.x, closest.y);
        split_linedef_at_vertex(doc, closest.ld as usize, new_v);
        new_v
    } else {
        closest.vert as usize
    };

    // handle both halves
    insert_linedef_autosplit(doc, config, v1, mid_v, no_fill, scale);
    insert_linedef_autosplit(doc, config, mid_v, v2, no_fill, scale);
}

/// Derive a selection of `dest_type` objects from `src` (e.g. the
/// vertices belonging to selected linedefs or sectors).
pub fn convert_selection(doc: &Document, src: &Selection, dest_type: ObjType) -> Selection {
    let mut dest = Selection::new(dest_type);

    if src.obj_type() == dest_type {
        dest.merge(src);
        return dest;
    }

    match (src.obj_type(), dest_type) {
        (ObjType::Sectors, ObjType::Things) => {
            for t in 0..doc.num_things() {
                let thing = doc.thing(t);
                let obj = nearest_sector(doc, thing.raw_x, thing.raw_y);
                if obj.valid() && src.get(obj.num as usize) {
                    dest.set(t);
                }
            }
        }

        (ObjType::Sectors, ObjType::Linedefs) => {
            for l in 0..doc.num_linedefs() {
                let line = doc.linedef(l);
                if side_in_selection(doc, &line, src) {
                    dest.set(l);
                }
            }
        }

        (ObjType::Sectors, ObjType::Vertices) => {
            for l in 0..doc.num_linedefs() {
                let line = doc.linedef(l);
                if side_in_selection(doc, &line, src) {
                    dest.set(line.start);
                    dest.set(line.end);
                }
            }
        }

        (ObjType::Sectors, ObjType::Sidedefs) => {
            for n in 0..doc.num_sidedefs() {
                let sd = doc.sidedef(n);
                if sd.sector >= 0 && src.get(sd.sector as usize) {
                    dest.set(n);
                }
            }
        }

        (ObjType::Linedefs, ObjType::Sidedefs) => {
            for l in src.iter() {
                let line = doc.linedef(l);
                if line.right >= 0 {
                    dest.set(line.right as usize);
                }
                if line.left >= 0 {
                    dest.set(line.left as usize);
                }
            }
        }

        (ObjType::Linedefs, ObjType::Vertices) => {
            for l in src.iter() {
                let line = doc.linedef(l);
                dest.set(line.start);
                dest.set(line.end);
            }
        }

        (ObjType::Vertices, ObjType::Linedefs) => {
            // only lines with BOTH endpoints selected
            for l in 0..doc.num_linedefs() {
                let line = doc.linedef(l);
                if src.get(line.start) && src.get(line.end) {
                    dest.set(l);
                }
            }
        }

        _ => {}
    }

    dest
}

fn side_in_selection(doc: &Document, line: &LineDef, sectors: &Selection) -> bool {
    for sd in [line.right, line.left] {
        if sd >= 0 {
            let sec = doc.sidedef(sd as usize).sector;
            if sec >= 0 && sectors.get(sec as usize) {
                return true;
            }
        }
    }
    false
}

fn do_move_objects(doc: &Document, list: &Selection, dx: i32, dy: i32, dz: i32) {
    match list.obj_type() {
        ObjType::Things => {
            for t in list.iter() {
                doc.mutate_thing(t, |thing| {
                    thing.raw_x += dx;
                    thing.raw_y += dy;
                });
            }
        }

        ObjType::Vertices => {
            for v in list.iter() {
                let vert = doc.vertex(v);
                doc.move_vertex(v, vert.raw_x + dx, vert.raw_y + dy);
            }
        }

        ObjType::Sectors => {
            // apply the Z delta, then move the boundary vertices
            for s in list.iter() {
                let sec = doc.sector(s);
                doc.set_sector_heights(s, sec.floor_height + dz, sec.ceiling_height + dz);
            }

            let verts = convert_selection(doc, list, ObjType::Vertices);
            do_move_objects(doc, &verts, dx, dy, dz);
        }

        ObjType::Linedefs => {
            let verts = convert_selection(doc, list, ObjType::Vertices);
            do_move_objects(doc, &verts, dx, dy, dz);
        }

        ObjType::Sidedefs => {}
    }
}

/// Move the selected objects by a map-space delta.  For sectors, the
/// things inside them move too (located before any geometry moves).
pub fn move_objects(doc: &Document, list: &Selection, dx: i32, dy: i32, dz: i32) {
    if list.empty() {
        return;
    }

    if list.obj_type() == ObjType::Sectors {
        let things = convert_selection(doc, list, ObjType::Things);
        do_move_objects(doc, &things, dx, dy, dz);
    }

    do_move_objects(doc, list, dx, dy, dz);
}

/// Centre of a group of objects, averaging the coordinates (which
/// often differs from the middle of the bounding box).
pub fn objs_calc_middle(doc: &Document, list: &Selection) -> (i32, i32) {
    if list.empty() {
        return (0, 0);
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut count = 0;

    match list.obj_type() {
        ObjType::Things => {
            for t in list.iter() {
                let thing = doc.thing(t);
                sum_x += thing.raw_x as f64;
                sum_y += thing.raw_y as f64;
                count += 1;
            }
        }

        ObjType::Vertices => {
            for v in list.iter() {
                let vert = doc.vertex(v);
                sum_x += vert.raw_x as f64;
                sum_y += vert.raw_y as f64;
                count += 1;
            }
        }

        // everything else: use the vertices
        _ => {
            let verts = convert_selection(doc, list, ObjType::Vertices);
            return objs_calc_middle(doc, &verts);
        }
    }

    assert!(count > 0);

    (
        (sum_x / count as f64).round() as i32,
        (sum_y / count as f64).round() as i32,
    )
}

/// Bounding box that completely includes the selected objects.
/// Returns `(0, 0, 0, 0)` for an empty selection.
pub fn objs_calc_bbox(doc: &Document, list: &Selection) -> (i32, i32, i32, i32) {
    if list.empty() {
        return (0, 0, 0, 0);
    }

    let mut x1 = i32::MAX;
    let mut y1 = i32::MAX;
    let mut x2 = i32::MIN;
    let mut y2 = i32::MIN;

    match list.obj_type() {
        ObjType::Things => {
            for t in list.iter() {
                let thing = doc.thing(t);
                let r = thing.radius();
                x1 = x1.min(thing.raw_x - r);
                y1 = y1.min(thing.raw_y - r);
                x2 = x2.max(thing.raw_x + r);
                y2 = y2.max(thing.raw_y + r);
            }
        }

        ObjType::Vertices => {
            for v in list.iter() {
                let vert = doc.vertex(v);
                x1 = x1.min(vert.raw_x);
                y1 = y1.min(vert.raw_y);
                x2 = x2.max(vert.raw_x);
                y2 = y2.max(vert.raw_y);
            }
        }

        _ => {
            let verts = convert_selection(doc, list, ObjType::Vertices);
            return objs_calc_bbox(doc, &verts);
        }
    }

    assert!(x1 <= x2 && y1 <= y2);

    (x1, y1, x2, y2)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_create_square_sector() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = create_square_sector(&doc, &config, 0, 0, None);

        assert_eq!(doc.num_sectors(), 1);
        assert_eq!(doc.num_vertices(), 4);
        assert_eq!(doc.num_linedefs(), 4);
        assert_eq!(doc.num_sidedefs(), 4);

        for n in 0..4 {
            let line = doc.linedef(n);
            assert!(line.right >= 0);
            assert_eq!(line.left, -1);
            assert_eq!(doc.sidedef(line.right as usize).sector, sec as i32);
            assert_eq!(doc.calc_length(&line), config.new_sector_size as f64);
        }

        // the loop must be closed
        assert!(trace_line_loop(&doc, 0, Side::Right, false).is_some());
    }

    #[test]
    fn test_flip_linedef() {
        let doc = Document::new();
        let config = EditorConfig::default();
        create_square_sector(&doc, &config, 0, 0, None);

        let before = doc.linedef(0);
        flip_linedef(&doc, 0);
        let after = doc.linedef(0);

        assert_eq!(after.start, before.end);
        assert_eq!(after.end, before.start);
        assert_eq!(after.left, before.right);
        assert_eq!(after.right, before.left);
    }

    #[test]
    fn test_split_preserves_total_length() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(100, 0);
        let ld = doc.add_linedef(LineDef::new(a, b));

        let v = doc.add_vertex(30, 0);
        let new_ld = split_linedef_at_vertex(&doc, ld, v);

        let first = doc.linedef(ld);
        let second = doc.linedef(new_ld);

        assert_eq!(first.end, v);
        assert_eq!(second.start, v);
        assert_eq!(second.end, b);
        assert_eq!(
            doc.calc_length(&first) + doc.calc_length(&second),
            100.0
        );
    }

    #[test]
    fn test_split_adjusts_offsets() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(100, 0);

        doc.add_sector(Sector::new(0, 128, "F".into(), "C".into(), 160, 0, 0));
        let sd = doc.add_sidedef(SideDef::new(5, 0, "-".into(), "-".into(), "W".into(), 0));

        let mut line = LineDef::new(a, b);
        line.right = sd as i32;
        let ld = doc.add_linedef(line);

        let v = doc.add_vertex(30, 0);
        let new_ld = split_linedef_at_vertex(&doc, ld, v);

        let second = doc.linedef(new_ld);
        assert!(second.right >= 0);
        assert_ne!(second.right as usize, sd);
        assert_eq!(doc.sidedef(second.right as usize).x_offset, 5 + 30);
        assert_eq!(doc.sidedef(sd).x_offset, 5);
    }

    #[test]
    fn test_delete_vertex_cascades() {
        let doc = Document::new();
        bare_square(&doc, 0, 0, 128);

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(0);

        delete_objects(&doc, &sel);

        assert_eq!(doc.num_vertices(), 3);
        // the two lines touching vertex 0 went away
        assert_eq!(doc.num_linedefs(), 2);
        for n in 0..doc.num_linedefs() {
            let line = doc.linedef(n);
            assert!(line.start < 3 && line.end < 3);
        }
    }

    #[test]
    fn test_delete_sector_cascades() {
        let doc = Document::new();
        let config = EditorConfig::default();
        let sec = create_square_sector(&doc, &config, 0, 0, None);

        let mut sel = Selection::new(ObjType::Sectors);
        sel.set(sec);

        delete_objects(&doc, &sel);

        assert_eq!(doc.num_sectors(), 0);
        assert_eq!(doc.num_sidedefs(), 0);
        // lines remain, now bare
        for n in 0..doc.num_linedefs() {
            let line = doc.linedef(n);
            assert_eq!(line.right, -1);
            assert_eq!(line.left, -1);
        }
    }

    #[test]
    fn test_merge_vertex_removes_collapsed_line() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(64, 0);
        let c = doc.add_vertex(128, 0);
        doc.add_linedef(LineDef::new(a, b));
        doc.add_linedef(LineDef::new(b, c));

        merge_vertex(&doc, b, c, false);

        // the line between b and c collapsed; the other now ends at c
        assert_eq!(doc.num_linedefs(), 1);
        let line = doc.linedef(0);
        assert_eq!(line.start, a);
        assert_eq!(line.end, c);
    }

    #[test]
    fn test_merge_vertex_removes_overlap() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(64, 8);
        let b2 = doc.add_vertex(64, 0);
        doc.add_linedef(LineDef::new(a, b));
        doc.add_linedef(LineDef::new(a, b2));

        // merging b onto b2 would make the two lines identical
        merge_vertex(&doc, b, b2, false);

        assert_eq!(doc.num_linedefs(), 1);
    }

    #[test]
    fn test_insert_linedef_closes_fresh_loop() {
        let doc = Document::new();
        let config = EditorConfig::default();

        // three sides of a square, then close it
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 128);
        let c = doc.add_vertex(128, 128);
        let d = doc.add_vertex(128, 0);
        doc.add_linedef(LineDef::new(a, b));
        doc.add_linedef(LineDef::new(b, c));
        doc.add_linedef(LineDef::new(c, d));

        insert_linedef(&doc, &config, d, a, false);

        assert_eq!(doc.num_sectors(), 1);
        for n in 0..4 {
            let line = doc.linedef(n);
            assert!(line.right >= 0, "line {} should face the new sector", n);
            assert_eq!(doc.sidedef(line.right as usize).sector, 0);
        }
    }

    #[test]
    fn test_insert_linedef_splits_sector() {
        let doc = Document::new();
        let config = EditorConfig::default();

        // a filled square, then a line across the middle
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 128);
        let c = doc.add_vertex(128, 128);
        let d = doc.add_vertex(128, 0);
        doc.add_linedef(LineDef::new(a, b));
        doc.add_linedef(LineDef::new(b, c));
        doc.add_linedef(LineDef::new(c, d));
        insert_linedef(&doc, &config, d, a, false);
        assert_eq!(doc.num_sectors(), 1);

        // split from the middle of the bottom to the middle of the top
        let m1 = doc.add_vertex(64, 0);
        split_linedef_at_vertex(&doc, 3, m1);
        let m2 = doc.add_vertex(64, 128);
        split_linedef_at_vertex(&doc, 1, m2);

        insert_linedef(&doc, &config, m1, m2, false);

        assert_eq!(doc.num_sectors(), 2);

        // both sides of the divider are closed
        let divider = doc.num_linedefs() - 1;
        let line = doc.linedef(divider);
        assert!(line.right >= 0);
        assert!(line.left >= 0);
        assert_ne!(
            doc.sidedef(line.right as usize).sector,
            doc.sidedef(line.left as usize).sector
        );
    }

    #[test]
    fn test_insert_autosplit_crosses_line() {
        let doc = Document::new();
        let config = EditorConfig::default();

        // an existing vertical line, and a new horizontal line
        // crossing it
        let a = doc.add_vertex(64, -64);
        let b = doc.add_vertex(64, 64);
        doc.add_linedef(LineDef::new(a, b));

        let p = doc.add_vertex(0, 0);
        let q = doc.add_vertex(128, 0);

        insert_linedef_autosplit(&doc, &config, p, q, true, 1.0);

        // the vertical line was split in two, and the new line in two
        assert_eq!(doc.num_vertices(), 5);
        assert_eq!(doc.num_linedefs(), 4);
    }

    #[test]
    fn test_move_objects() {
        let doc = Document::new();
        let config = EditorConfig::default();
        let sec = create_square_sector(&doc, &config, 0, 0, None);

        let mut sel = Selection::new(ObjType::Sectors);
        sel.set(sec);

        move_objects(&doc, &sel, 32, -16, 8);

        let v = doc.vertex(0);
        assert_eq!((v.raw_x, v.raw_y), (32, -16));

        let s = doc.sector(sec);
        assert_eq!(s.floor_height, 8);
        assert_eq!(s.ceiling_height, 136);
    }

    #[test]
    fn test_objs_calc_middle_and_bbox() {
        let doc = Document::new();
        doc.add_vertex(0, 0);
        doc.add_vertex(100, 50);

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(0);
        sel.set(1);

        assert_eq!(objs_calc_middle(&doc, &sel), (50, 25));
        assert_eq!(objs_calc_bbox(&doc, &sel), (0, 0, 100, 50));
    }

    #[test]
    fn test_disconnect_vertex() {
        let doc = Document::new();
        bare_square(&doc, 0, 0, 128);

        // vertex 0 joins two lines; pulling it apart gives each line
        // its own endpoint
        disconnect_vertex(&doc, 0);

        assert_eq!(doc.num_vertices(), 5);

        // line 0 got a fresh start vertex; line 3 kept the original
        let line0 = doc.linedef(0);
        let line3 = doc.linedef(3);
        assert_eq!(line0.start, 4);
        assert_eq!(line3.end, 0);
    }

    #[test]
    fn test_linedef_already_exists() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(64, 0);
        let c = doc.add_vertex(128, 0);
        doc.add_linedef(LineDef::new(a, b));

        assert!(linedef_already_exists(&doc, a, b));
        assert!(linedef_already_exists(&doc, b, a));
        assert!(!linedef_already_exists(&doc, b, c));
    }
}
