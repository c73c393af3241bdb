// src/editor/transform.rs
//
// Geometric transforms over a selection: scale, skew, rotate, mirror
// and grid quantization.

use std::f64::consts::PI;

use crate::document::{Document, ObjType};
use crate::editor::ops::{convert_selection, objs_calc_middle};
use crate::selection::Selection;

/// A 2D transform around a chosen origin.  The rotation angle uses
/// the binary format of thing angles, where 65536 is a full turn.
#[derive(Debug, Clone)]
pub struct Transform {
    pub mid_x: i32,
    pub mid_y: i32,

    pub scale_x: f64,
    pub scale_y: f64,

    pub skew_x: f64,
    pub skew_y: f64,

    pub rotate: i32,
}

impl Transform {
    pub fn new(mid_x: i32, mid_y: i32) -> Self {
        Transform {
            mid_x,
            mid_y,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            rotate: 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Transform::new(0, 0);
    }

    /// Transform one point: rotate, then skew, then scale, all
    /// relative to the middle coordinate.
    pub fn apply(&self, x: i32, y: i32) -> (i32, i32) {
        let mut x0 = (x - self.mid_x) as f64;
        let mut y0 = (y - self.mid_y) as f64;

        if self.rotate != 0 {
            let angle = self.rotate as f64 * PI / 32768.0;
            let s = angle.sin();
            let c = angle.cos();

            let rx = x0 * c - y0 * s;
            let ry = y0 * c + x0 * s;

            x0 = rx;
            y0 = ry;
        }

        if self.skew_x != 0.0 || self.skew_y != 0.0 {
            let sx = x0 + y0 * self.skew_x;
            let sy = y0 + x0 * self.skew_y;

            x0 = sx;
            y0 = sy;
        }

        (
            self.mid_x + (x0 * self.scale_x).round() as i32,
            self.mid_y + (y0 * self.scale_y).round() as i32,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::new(0, 0)
    }
}

/// Apply a transform to the selected objects.  Anything other than
/// things is transformed through its vertices.
pub fn apply_transform(doc: &Document, list: &Selection, t: &Transform) {
    if list.empty() {
        return;
    }

    match list.obj_type() {
        ObjType::Things => {
            for n in list.iter() {
                let thing = doc.thing(n);
                let (x, y) = t.apply(thing.raw_x, thing.raw_y);
                doc.mutate_thing(n, |th| {
                    th.raw_x = x;
                    th.raw_y = y;
                });
            }
        }

        ObjType::Vertices => {
            for v in list.iter() {
                let vert = doc.vertex(v);
                let (x, y) = t.apply(vert.raw_x, vert.raw_y);
                doc.move_vertex(v, x, y);
            }
        }

        _ => {
            let verts = convert_selection(doc, list, ObjType::Vertices);
            apply_transform(doc, &verts, t);
        }
    }
}

/// Scale the selection outward from its middle point.
pub fn enlarge_objects(doc: &Document, list: &Selection, mul: i32) {
    scale_objects(doc, list, mul as f64);
}

/// Scale the selection inward toward its middle point.
pub fn shrink_objects(doc: &Document, list: &Selection, div: i32) {
    scale_objects(doc, list, 1.0 / div as f64);
}

fn scale_objects(doc: &Document, list: &Selection, factor: f64) {
    if list.empty() {
        return;
    }

    let (mid_x, mid_y) = objs_calc_middle(doc, list);

    let mut t = Transform::new(mid_x, mid_y);
    t.scale_x = factor;
    t.scale_y = factor;

    apply_transform(doc, list, &t);
}

fn do_mirror_things(doc: &Document, list: &Selection, is_vert: bool, mid_x: i32, mid_y: i32) {
    for n in list.iter() {
        let thing = doc.thing(n);

        if is_vert {
            let new_y = 2 * mid_y - thing.raw_y;
            let new_angle = if thing.angle != 0 {
                360 - thing.angle
            } else {
                0
            };
            doc.mutate_thing(n, |th| {
                th.raw_y = new_y;
                th.angle = new_angle;
            });
        } else {
            let new_x = 2 * mid_x - thing.raw_x;
            let new_angle = (if thing.angle > 180 { 540 } else { 180 }) - thing.angle;
            doc.mutate_thing(n, |th| {
                th.raw_x = new_x;
                th.angle = new_angle;
            });
        }
    }
}

fn do_mirror_vertices(doc: &Document, verts: &Selection, is_vert: bool, mid_x: i32, mid_y: i32) {
    for v in verts.iter() {
        let vert = doc.vertex(v);
        if is_vert {
            doc.move_vertex(v, vert.raw_x, 2 * mid_y - vert.raw_y);
        } else {
            doc.move_vertex(v, 2 * mid_x - vert.raw_x, vert.raw_y);
        }
    }

    // mirroring reverses the winding, so flip the start/end of every
    // line whose two vertices were mirrored (sidedefs stay put)
    let lines = convert_selection(doc, verts, ObjType::Linedefs);

    for l in lines.iter() {
        doc.mutate_linedef(l, |line| {
            std::mem::swap(&mut line.start, &mut line.end);
        });
    }

    doc.on_linedef_side_changed();
}

/// Mirror the selection about a horizontal axis (`is_vert`) or a
/// vertical one, through the middle of the selection.
pub fn mirror_objects(doc: &Document, list: &Selection, is_vert: bool) {
    if list.empty() {
        return;
    }

    let (mid_x, mid_y) = objs_calc_middle(doc, list);

    match list.obj_type() {
        ObjType::Things => do_mirror_things(doc, list, is_vert, mid_x, mid_y),

        ObjType::Vertices => do_mirror_vertices(doc, list, is_vert, mid_x, mid_y),

        _ => {
            // in sector mode, the things inside those sectors move too
            if list.obj_type() == ObjType::Sectors {
                let things = convert_selection(doc, list, ObjType::Things);
                do_mirror_things(doc, &things, is_vert, mid_x, mid_y);
            }

            let verts = convert_selection(doc, list, ObjType::Vertices);
            do_mirror_vertices(doc, &verts, is_vert, mid_x, mid_y);
        }
    }
}

fn calc_rotated(x: i32, y: i32, mid_x: i32, mid_y: i32, anti_clockwise: bool) -> (i32, i32) {
    if anti_clockwise {
        (mid_x - (y - mid_y), mid_y + (x - mid_x))
    } else {
        (mid_x + (y - mid_y), mid_y - (x - mid_x))
    }
}

fn do_rotate90_things(
    doc: &Document,
    list: &Selection,
    anti_clockwise: bool,
    mid_x: i32,
    mid_y: i32,
) {
    for n in list.iter() {
        let thing = doc.thing(n);

        let (x, y) = calc_rotated(thing.raw_x, thing.raw_y, mid_x, mid_y, anti_clockwise);

        let delta = if anti_clockwise { 90 } else { -90 };
        let new_angle = (thing.angle + delta).rem_euclid(360);

        doc.mutate_thing(n, |th| {
            th.raw_x = x;
            th.raw_y = y;
            th.angle = new_angle;
        });
    }
}

/// Rotate the selection by a quarter turn about its middle point.
pub fn rotate90_objects(doc: &Document, list: &Selection, anti_clockwise: bool) {
    if list.empty() {
        return;
    }

    let (mid_x, mid_y) = objs_calc_middle(doc, list);

    match list.obj_type() {
        ObjType::Things => do_rotate90_things(doc, list, anti_clockwise, mid_x, mid_y),

        ObjType::Vertices => {
            for v in list.iter() {
                let vert = doc.vertex(v);
                let (x, y) = calc_rotated(vert.raw_x, vert.raw_y, mid_x, mid_y, anti_clockwise);
                doc.move_vertex(v, x, y);
            }
        }

        _ => {
            if list.obj_type() == ObjType::Sectors {
                let things = convert_selection(doc, list, ObjType::Things);
                do_rotate90_things(doc, &things, anti_clockwise, mid_x, mid_y);
            }

            let verts = convert_selection(doc, list, ObjType::Vertices);
            rotate90_with_middle(doc, &verts, anti_clockwise, mid_x, mid_y);
        }
    }
}

fn rotate90_with_middle(
    doc: &Document,
    verts: &Selection,
    anti_clockwise: bool,
    mid_x: i32,
    mid_y: i32,
) {
    for v in verts.iter() {
        let vert = doc.vertex(v);
        let (x, y) = calc_rotated(vert.raw_x, vert.raw_y, mid_x, mid_y, anti_clockwise);
        doc.move_vertex(v, x, y);
    }
}

fn quant_snap(v: i32, grid: i32, round_up: bool) -> i32 {
    if round_up {
        (v as f64 / grid as f64).ceil() as i32 * grid
    } else {
        (v as f64 / grid as f64).floor() as i32 * grid
    }
}

fn thing_spot_in_use(doc: &Document, x: i32, y: i32) -> bool {
    let things = doc.things.read();
    things.iter().any(|t| t.raw_x == x && t.raw_y == y)
}

fn vertex_spot_in_use(doc: &Document, x: i32, y: i32) -> bool {
    let vertices = doc.vertices.read();
    vertices.iter().any(|v| v.matches(x, y))
}

fn quantize_things(doc: &Document, list: &Selection, grid: i32) -> usize {
    let mut unable_count = 0;

    for n in list.iter() {
        let thing = doc.thing(n);

        if thing.raw_x % grid == 0 && thing.raw_y % grid == 0 {
            continue;
        }

        // four possible snap spots: each coordinate may round either way
        let mut moved = false;

        for pass in 0..4 {
            let x2 = quant_snap(thing.raw_x, grid, pass & 1 != 0);
            let y2 = quant_snap(thing.raw_y, grid, pass & 2 != 0);

            if !thing_spot_in_use(doc, x2, y2) {
                doc.mutate_thing(n, |th| {
                    th.raw_x = x2;
                    th.raw_y = y2;
                });
                moved = true;
                break;
            }
        }

        if !moved {
            unable_count += 1;
        }
    }

    unable_count
}

fn quantize_vertices(doc: &Document, list: &Selection, grid: i32) -> usize {
    let mut unable_count = 0;

    for v in list.iter() {
        let vert = doc.vertex(v);

        if vert.raw_x % grid == 0 && vert.raw_y % grid == 0 {
            continue;
        }

        let mut moved = false;

        for pass in 0..4 {
            let x2 = quant_snap(vert.raw_x, grid, pass & 1 != 0);
            let y2 = quant_snap(vert.raw_y, grid, pass & 2 != 0);

            if !vertex_spot_in_use(doc, x2, y2) {
                doc.move_vertex(v, x2, y2);
                moved = true;
                break;
            }
        }

        if !moved {
            unable_count += 1;
        }
    }

    unable_count
}

/// Snap the selected objects onto the given grid, refusing to stack
/// two objects onto the same spot.  Returns how many could NOT be
/// moved.
pub fn quantize_objects(doc: &Document, list: &Selection, grid: i32) -> usize {
    assert!(grid >= 1);

    if list.empty() {
        return 0;
    }

    match list.obj_type() {
        ObjType::Things => quantize_things(doc, list, grid),
        ObjType::Vertices => quantize_vertices(doc, list, grid),
        _ => {
            let verts = convert_selection(doc, list, ObjType::Vertices);
            quantize_vertices(doc, &verts, grid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{LineDef, Thing};

    #[test]
    fn test_apply_rotate_quarter_turn() {
        let mut t = Transform::new(0, 0);
        t.rotate = 16384; // 90 degrees

        assert_eq!(t.apply(10, 0), (0, 10));
        assert_eq!(t.apply(0, 10), (-10, 0));
    }

    #[test]
    fn test_apply_scale_about_middle() {
        let mut t = Transform::new(100, 100);
        t.scale_x = 2.0;
        t.scale_y = 2.0;

        assert_eq!(t.apply(110, 100), (120, 100));
        assert_eq!(t.apply(100, 100), (100, 100));
    }

    #[test]
    fn test_apply_skew() {
        let mut t = Transform::new(0, 0);
        t.skew_x = 1.0;

        // each unit of Y pushes X by one unit
        assert_eq!(t.apply(0, 10), (10, 10));
    }

    #[test]
    fn test_enlarge_vertices() {
        let doc = Document::new();
        doc.add_vertex(0, 0);
        doc.add_vertex(100, 0);

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(0);
        sel.set(1);

        enlarge_objects(&doc, &sel, 2);

        assert_eq!(doc.vertex(0).raw_x, -50);
        assert_eq!(doc.vertex(1).raw_x, 150);
    }

    #[test]
    fn test_mirror_things_vertically() {
        let doc = Document::new();
        doc.add_thing(Thing::new(0, 0, 90, 3001, 7));
        doc.add_thing(Thing::new(0, 100, 270, 3001, 7));

        let mut sel = Selection::new(ObjType::Things);
        sel.set(0);
        sel.set(1);

        mirror_objects(&doc, &sel, true);

        assert_eq!(doc.thing(0).raw_y, 100);
        assert_eq!(doc.thing(1).raw_y, 0);
        assert_eq!(doc.thing(0).angle, 270);
        assert_eq!(doc.thing(1).angle, 90);
    }

    #[test]
    fn test_mirror_things_horizontally() {
        let doc = Document::new();
        doc.add_thing(Thing::new(0, 0, 0, 3001, 7));
        doc.add_thing(Thing::new(100, 0, 45, 3001, 7));

        let mut sel = Selection::new(ObjType::Things);
        sel.set(0);
        sel.set(1);

        mirror_objects(&doc, &sel, false);

        assert_eq!(doc.thing(0).raw_x, 100);
        assert_eq!(doc.thing(1).raw_x, 0);
        assert_eq!(doc.thing(0).angle, 180);
        assert_eq!(doc.thing(1).angle, 135);
    }

    #[test]
    fn test_mirror_vertices_flips_lines() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 100);
        doc.add_linedef(LineDef::new(a, b));

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(a);
        sel.set(b);

        mirror_objects(&doc, &sel, true);

        // coordinates swapped AND the line reversed, keeping its
        // right side on the same geometric side
        assert_eq!(doc.vertex(a).raw_y, 100);
        assert_eq!(doc.vertex(b).raw_y, 0);
        let line = doc.linedef(0);
        assert_eq!(line.start, b);
        assert_eq!(line.end, a);
    }

    #[test]
    fn test_rotate90_vertices() {
        let doc = Document::new();
        doc.add_vertex(0, 0);
        doc.add_vertex(100, 0);

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(0);
        sel.set(1);

        rotate90_objects(&doc, &sel, true);

        // middle is (50, 0): the segment becomes vertical
        assert_eq!((doc.vertex(0).raw_x, doc.vertex(0).raw_y), (50, -50));
        assert_eq!((doc.vertex(1).raw_x, doc.vertex(1).raw_y), (50, 50));
    }

    #[test]
    fn test_rotate90_things_angle_wraps() {
        let doc = Document::new();
        doc.add_thing(Thing::new(0, 0, 0, 3001, 7));

        let mut sel = Selection::new(ObjType::Things);
        sel.set(0);

        rotate90_objects(&doc, &sel, false);
        assert_eq!(doc.thing(0).angle, 270);

        rotate90_objects(&doc, &sel, true);
        assert_eq!(doc.thing(0).angle, 0);
    }

    #[test]
    fn test_quantize_vertices() {
        let doc = Document::new();
        doc.add_vertex(13, 7);
        doc.add_vertex(64, 64);

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(0);
        sel.set(1);

        let unable = quantize_objects(&doc, &sel, 8);
        assert_eq!(unable, 0);

        let v = doc.vertex(0);
        assert_eq!(v.raw_x % 8, 0);
        assert_eq!(v.raw_y % 8, 0);

        // already on grid, untouched
        let v = doc.vertex(1);
        assert_eq!((v.raw_x, v.raw_y), (64, 64));
    }

    #[test]
    fn test_quantize_avoids_occupied_spot() {
        let doc = Document::new();
        // all four snap spots for (4, 4) on an 8 grid are taken
        doc.add_vertex(0, 0);
        doc.add_vertex(8, 0);
        doc.add_vertex(0, 8);
        doc.add_vertex(8, 8);
        doc.add_vertex(4, 4);

        let mut sel = Selection::new(ObjType::Vertices);
        sel.set(4);

        let unable = quantize_objects(&doc, &sel, 8);
        assert_eq!(unable, 1);
        assert_eq!((doc.vertex(4).raw_x, doc.vertex(4).raw_y), (4, 4));
    }
}
