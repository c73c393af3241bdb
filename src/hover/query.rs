// src/hover/query.rs

use crate::document::{Document, ObjType, Objid};
use crate::geom::{approx_dist_to_line, move_coord_onto};
use crate::map::LineDef;

/// Largest thing radius we ever expect, used to size search boxes.
const MAX_RADIUS: i32 = 128;

/// Distance from the point `(x, y)` to a linedef, clamped to the
/// nearer endpoint when the point lies beyond either end.
pub fn approx_dist_to_linedef(doc: &Document, line: &LineDef, x: f64, y: f64) -> f64 {
    let (x1, y1, x2, y2) = doc.line_coords(line);
    approx_dist_to_line(x, y, x1 as f64, y1 as f64, x2 as f64, y2 as f64)
}

// apparent radius of a vertex on screen, in pixels
fn vertex_radius(scale: f64) -> i32 {
    let r = (6.0 * (0.26 + scale / 2.0)) as i32;
    r.min(12)
}

/// Determine which vertex is under the pointer.  `scale` is map units
/// to screen pixels; the hit slack shrinks as the view zooms in.
pub fn nearest_vertex(doc: &Document, x: f64, y: f64, scale: f64) -> Objid {
    let screen_pix = vertex_radius(scale);

    let mut mapslack = 1.0 + (4 + screen_pix) as f64 / scale;

    // workaround for overly zealous highlighting when zoomed in far
    if scale >= 15.0 {
        mapslack *= 0.7;
    }
    if scale >= 31.0 {
        mapslack *= 0.5;
    }

    let lx = (x - mapslack).floor();
    let ly = (y - mapslack).floor();
    let hx = (x + mapslack).ceil();
    let hy = (y + mapslack).ceil();

    let mut best: i32 = -1;
    let mut best_dist = 9e9;

    let vertices = doc.vertices.read();

    for (n, v) in vertices.iter().enumerate() {
        let vx = v.raw_x as f64;
        let vy = v.raw_y as f64;

        if vx < lx || vx > hx || vy < ly || vy > hy {
            continue;
        }

        let dist = (x - vx).hypot(y - vy);

        if dist > mapslack {
            continue;
        }

        // "<=" so superimposed vertices resolve to the highest index
        if dist <= best_dist {
            best = n as i32;
            best_dist = dist;
        }
    }

    if best >= 0 {
        Objid::new(ObjType::Vertices, best)
    } else {
        Objid::nil(ObjType::Vertices)
    }
}

/// Determine which linedef is under the pointer.
pub fn nearest_linedef(doc: &Document, x: f64, y: f64, scale: f64) -> Objid {
    // slack in map units
    let mapslack = 2.0 + 16.0 / scale;

    let lx = (x - mapslack).floor();
    let ly = (y - mapslack).floor();
    let hx = (x + mapslack).ceil();
    let hy = (y + mapslack).ceil();

    let mut best: i32 = -1;
    let mut best_dist = 9e9;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    for (n, line) in linedefs.iter().enumerate() {
        let x1 = vertices[line.start].raw_x as f64;
        let y1 = vertices[line.start].raw_y as f64;
        let x2 = vertices[line.end].raw_x as f64;
        let y2 = vertices[line.end].raw_y as f64;

        // cheap bounding-box rejection filters out nearly every line
        if x1.max(x2) < lx || x1.min(x2) > hx || y1.max(y2) < ly || y1.min(y2) > hy {
            continue;
        }

        let dist = approx_dist_to_line(x, y, x1, y1, x2, y2);

        if dist > mapslack {
            continue;
        }

        // "<=" so overlapping linedefs resolve to the highest index
        if dist <= best_dist {
            best = n as i32;
            best_dist = dist;
        }
    }

    if best >= 0 {
        Objid::new(ObjType::Linedefs, best)
    } else {
        Objid::nil(ObjType::Linedefs)
    }
}

/// Determine which linedef would be split if a new vertex were added
/// at the given coordinates.  `ignore_vert` excludes lines touching a
/// vertex being dragged.
pub fn nearest_split_line(doc: &Document, x: i32, y: i32, ignore_vert: Option<usize>, scale: f64) -> Objid {
    let mapslack = 1 + (8.0 / scale).ceil() as i32;

    let lx = x - mapslack;
    let ly = y - mapslack;
    let hx = x + mapslack;
    let hy = y + mapslack;

    let mut best: i32 = -1;
    let mut best_dist = 9e9;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    for (n, line) in linedefs.iter().enumerate() {
        if let Some(iv) = ignore_vert {
            if line.start == iv || line.end == iv {
                continue;
            }
        }

        let x1 = vertices[line.start].raw_x;
        let y1 = vertices[line.start].raw_y;
        let x2 = vertices[line.end].raw_x;
        let y2 = vertices[line.end].raw_y;

        if x1.max(x2) < lx || x1.min(x2) > hx || y1.max(y2) < ly || y1.min(y2) > hy {
            continue;
        }

        // skip linedef if point matches a vertex
        if (x == x1 && y == y1) || (x == x2 && y == y2) {
            continue;
        }

        // skip linedef if too small to split
        if (x1 - x2).abs() < 4 && (y1 - y2).abs() < 4 {
            continue;
        }

        let dist = approx_dist_to_line(
            x as f64, y as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
        );

        if dist > mapslack as f64 {
            continue;
        }

        if dist <= best_dist {
            best = n as i32;
            best_dist = dist;
        }
    }

    if best >= 0 {
        Objid::new(ObjType::Linedefs, best)
    } else {
        Objid::nil(ObjType::Linedefs)
    }
}

/// Closest linedef crossed by a horizontal ray through `(x, y)`.
/// The returned side is +1 (right), -1 (left) or 0 (exactly on it).
pub fn closest_line_casting_horiz(doc: &Document, x: i32, y: i32) -> Option<(usize, i32)> {
    let mut best_match: Option<usize> = None;
    let mut best_dist = 9e9;
    let mut best_side = 0;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    for (n, line) in linedefs.iter().enumerate() {
        let ly1 = vertices[line.start].raw_y;
        let ly2 = vertices[line.end].raw_y;

        // ignore purely horizontal lines
        if ly1 == ly2 {
            continue;
        }

        // does the linedef cross the horizontal ray?
        if ly1.min(ly2) >= y + 1 || ly1.max(ly2) <= y {
            continue;
        }

        let lx1 = vertices[line.start].raw_x;
        let lx2 = vertices[line.end].raw_x;

        let dist = lx1 as f64 - (x as f64 + 0.5)
            + (lx2 - lx1) as f64 * (y as f64 + 0.5 - ly1 as f64) / (ly2 - ly1) as f64;

        if dist.abs() < best_dist {
            best_match = Some(n);
            best_dist = dist.abs();

            best_side = if best_dist < 0.2 {
                0
            } else if (ly1 > ly2) == (dist > 0.0) {
                1
            } else {
                -1
            };
        }
    }

    best_match.map(|n| (n, best_side))
}

/// Closest linedef crossed by a vertical ray through `(x, y)`.
pub fn closest_line_casting_vert(doc: &Document, x: i32, y: i32) -> Option<(usize, i32)> {
    let mut best_match: Option<usize> = None;
    let mut best_dist = 9e9;
    let mut best_side = 0;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    for (n, line) in linedefs.iter().enumerate() {
        let lx1 = vertices[line.start].raw_x;
        let lx2 = vertices[line.end].raw_x;

        // ignore purely vertical lines
        if lx1 == lx2 {
            continue;
        }

        // does the linedef cross the vertical ray?
        if lx1.min(lx2) >= x + 1 || lx1.max(lx2) <= x {
            continue;
        }

        let ly1 = vertices[line.start].raw_y;
        let ly2 = vertices[line.end].raw_y;

        let dist = ly1 as f64 - (y as f64 + 0.5)
            + (ly2 - ly1) as f64 * (x as f64 + 0.5 - lx1 as f64) / (lx2 - lx1) as f64;

        if dist.abs() < best_dist {
            best_match = Some(n);
            best_dist = dist.abs();

            best_side = if best_dist < 0.2 {
                0
            } else if (lx1 > lx2) == (dist < 0.0) {
                1
            } else {
                -1
            };
        }
    }

    best_match.map(|n| (n, best_side))
}

/// True when the point can see the void in some axis direction, i.e.
/// rays fired N/S/E/W do not all hit a linedef.
pub fn point_outside_of_map(doc: &Document, x: i32, y: i32) -> bool {
    // tracks which of the four directions have hit a line
    let mut dirs = 0;

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();

    for line in linedefs.iter() {
        let lx1 = vertices[line.start].raw_x;
        let ly1 = vertices[line.start].raw_y;
        let lx2 = vertices[line.end].raw_x;
        let ly2 = vertices[line.end].raw_y;

        // does the linedef cross the horizontal ray?
        if ly1.min(ly2) <= y && ly1.max(ly2) >= y + 1 {
            let dist = lx1 as f64 - (x as f64 + 0.5)
                + (lx2 - lx1) as f64 * (y as f64 + 0.5 - ly1 as f64) / (ly2 - ly1) as f64;

            dirs |= if dist < 0.0 { 1 } else { 2 };

            if dirs == 15 {
                return false;
            }
        }

        // does the linedef cross the vertical ray?
        if lx1.min(lx2) <= x && lx1.max(lx2) >= x + 1 {
            let dist = ly1 as f64 - (y as f64 - 0.5)
                + (ly2 - ly1) as f64 * (x as f64 + 0.5 - lx1 as f64) / (lx2 - lx1) as f64;

            dirs |= if dist < 0.0 { 4 } else { 8 };

            if dirs == 15 {
                return false;
            }
        }
    }

    true
}

/// Determine which sector is under the pointer, by casting rays in
/// all four axis directions and taking the closest crossed linedef.
/// This reaches self-referencing sectors and purely horizontal lines.
pub fn nearest_sector(doc: &Document, x: i32, y: i32) -> Objid {
    let hit1 = closest_line_casting_horiz(doc, x, y);
    let hit2 = closest_line_casting_vert(doc, x, y);

    let best = match (hit1, hit2) {
        (h1, None) => h1,
        (None, h2) => h2,
        (Some((line1, side1)), Some((line2, side2))) => {
            let l1 = doc.linedef(line1);
            let l2 = doc.linedef(line2);
            if approx_dist_to_linedef(doc, &l2, x as f64, y as f64)
                < approx_dist_to_linedef(doc, &l1, x as f64, y as f64)
            {
                Some((line2, side2))
            } else {
                Some((line1, side1))
            }
        }
    };

    if let Some((ld, side)) = best {
        let line = doc.linedef(ld);
        let sd_num = if side < 0 { line.left } else { line.right };

        if sd_num >= 0 {
            return Objid::new(ObjType::Sectors, doc.sidedef(sd_num as usize).sector);
        }
    }

    Objid::nil(ObjType::Sectors)
}

// Ordering for competing things under the pointer: being inside wins,
// then smaller things mask larger ones, then plain distance.
struct ThingComparer {
    distance: f64,
    inside: bool,
    radius: i32,
}

impl ThingComparer {
    fn beats(&self, other: &ThingComparer) -> bool {
        if self.inside != other.inside {
            return self.inside;
        }
        if self.radius != other.radius {
            return self.radius < other.radius;
        }
        self.distance <= other.distance
    }
}

/// Determine which thing is under the pointer.
pub fn nearest_thing(doc: &Document, x: f64, y: f64, scale: f64) -> Objid {
    let mapslack = 1.0 + 16.0 / scale;

    let max_radius = MAX_RADIUS as f64 + mapslack.ceil();

    let lx = x - max_radius;
    let ly = y - max_radius;
    let hx = x + max_radius;
    let hy = y + max_radius;

    let mut best: i32 = -1;
    let mut best_comp = ThingComparer {
        distance: 9e9,
        inside: false,
        radius: 1 << 30,
    };

    let things = doc.things.read();

    for (n, thing) in things.iter().enumerate() {
        let tx = thing.raw_x as f64;
        let ty = thing.raw_y as f64;

        if tx < lx || tx > hx || ty < ly || ty > hy {
            continue;
        }

        // more accurate test using the real radius
        let r = thing.radius() as f64 + mapslack;

        if x < tx - r - mapslack || x > tx + r + mapslack || y < ty - r - mapslack
            || y > ty + r + mapslack
        {
            continue;
        }

        let comp = ThingComparer {
            distance: (x - tx).hypot(y - ty),
            inside: x > tx - r && x < tx + r && y > ty - r && y < ty + r,
            radius: r as i32,
        };

        if best < 0 || comp.beats(&best_comp) {
            best = n as i32;
            best_comp = comp;
        }
    }

    if best >= 0 {
        Objid::new(ObjType::Things, best)
    } else {
        Objid::nil(ObjType::Things)
    }
}

/// The object of the given type under the pointer, if any.
pub fn get_near_object(doc: &Document, obj_type: ObjType, x: f64, y: f64, scale: f64) -> Objid {
    match obj_type {
        ObjType::Things => nearest_thing(doc, x, y, scale),
        ObjType::Vertices => nearest_vertex(doc, x, y, scale),
        ObjType::Linedefs => nearest_linedef(doc, x, y, scale),
        ObjType::Sectors => nearest_sector(doc, x as i32, y as i32),
        ObjType::Sidedefs => Objid::nil(ObjType::Sidedefs),
    }
}

/// Projection of `(x, y)` onto the nearest point of a linedef,
/// rounded to integer coordinates.  Used when dragging a vertex while
/// constrained to one of its lines.
pub fn moved_coord_onto_linedef(doc: &Document, ld: usize, x: i32, y: i32) -> (i32, i32) {
    let line = doc.linedef(ld);
    let (x1, y1, x2, y2) = doc.line_coords(&line);

    if doc.is_zero_length(&line) {
        return (x, y);
    }

    move_coord_onto(x, y, x1 as f64, y1 as f64, x2 as f64, y2 as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{LineDef, Sector, SideDef, Thing};

    fn square_room(doc: &Document) {
        // 256x256 square, lines wound clockwise so the right side
        // faces inward
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(0, 256);
        let c = doc.add_vertex(256, 256);
        let d = doc.add_vertex(256, 0);

        let sec = doc.add_sector(Sector::new(0, 128, "FLAT1".into(), "FLAT1".into(), 160, 0, 0));

        for (s, e) in [(a, b), (b, c), (c, d), (d, a)] {
            let sd = doc.add_sidedef(SideDef::new(
                0,
                0,
                "-".into(),
                "-".into(),
                "STARTAN2".into(),
                sec as i32,
            ));
            let mut line = LineDef::new(s, e);
            line.right = sd as i32;
            doc.add_linedef(line);
        }
    }

    #[test]
    fn test_nearest_vertex_picks_highest_on_tie() {
        let doc = Document::new();
        doc.add_vertex(100, 100);
        doc.add_vertex(100, 100);

        let o = nearest_vertex(&doc, 101.0, 100.0, 1.0);
        assert_eq!(o.num, 1);
    }

    #[test]
    fn test_nearest_vertex_respects_slack() {
        let doc = Document::new();
        doc.add_vertex(100, 100);

        assert!(nearest_vertex(&doc, 104.0, 100.0, 1.0).valid());
        assert!(!nearest_vertex(&doc, 200.0, 100.0, 1.0).valid());
    }

    #[test]
    fn test_nearest_linedef() {
        let doc = Document::new();
        square_room(&doc);

        let o = nearest_linedef(&doc, 2.0, 128.0, 1.0);
        assert!(o.valid());
        assert_eq!(o.num, 0);
    }

    #[test]
    fn test_nearest_sector_inside_square() {
        let doc = Document::new();
        square_room(&doc);

        let o = nearest_sector(&doc, 128, 128);
        assert_eq!(o.obj_type, ObjType::Sectors);
        assert_eq!(o.num, 0);
    }

    #[test]
    fn test_nearest_sector_outside_square() {
        let doc = Document::new();
        square_room(&doc);

        // the left side of the west wall has no sidedef
        assert!(!nearest_sector(&doc, -500, 128).valid());
    }

    #[test]
    fn test_point_outside_of_map() {
        let doc = Document::new();
        square_room(&doc);

        assert!(!point_outside_of_map(&doc, 128, 128));
        assert!(point_outside_of_map(&doc, 500, 128));
        assert!(point_outside_of_map(&doc, -500, -500));
    }

    #[test]
    fn test_nearest_thing_prefers_inside() {
        let doc = Document::new();
        // a big thing and a small thing at the same spot
        doc.add_thing(Thing::new(0, 0, 0, 3003, 7)); // radius 40
        doc.add_thing(Thing::new(10, 0, 0, 2014, 7)); // radius 20

        let o = nearest_thing(&doc, 10.0, 1.0, 1.0);
        assert_eq!(o.num, 1);
    }

    #[test]
    fn test_nearest_split_line_skips_endpoints() {
        let doc = Document::new();
        let a = doc.add_vertex(0, 0);
        let b = doc.add_vertex(128, 0);
        doc.add_linedef(LineDef::new(a, b));

        // exactly on an endpoint: no split candidate
        assert!(!nearest_split_line(&doc, 0, 0, None, 1.0).valid());
        // middle of the line: splittable
        assert!(nearest_split_line(&doc, 64, 2, None, 1.0).valid());
        // ignoring a vertex of the line excludes it
        assert!(!nearest_split_line(&doc, 64, 2, Some(a), 1.0).valid());
    }
}
