// src/subdiv/cache.rs
//
// Per-sector derived data: which linedefs touch the sector, its
// bounding box, its subdivision into trapezoids, and any 3D-floor
// info scanned from special line types.  Everything is rebuilt lazily
// after an invalidation; subdivisions additionally only on demand,
// sector by sector.

use std::sync::Arc;

use log::trace;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::map::Side;
use crate::subdiv::engine::{sweep_edges, SectorEdge, SectorSubdivision};

// vavoom style, dummy sector has floor above ceiling
pub const EXFL_VAVOOM: i32 = 1 << 0;
// only draw the ceiling of the dummy sector
pub const EXFL_TOP: i32 = 1 << 1;
// only draw the floor of the dummy sector
pub const EXFL_BOTTOM: i32 = 1 << 2;
// side texture comes from the upper on the sidedef
pub const EXFL_UPPER: i32 = 1 << 3;
// side texture comes from the lower on the sidedef
pub const EXFL_LOWER: i32 = 1 << 4;
// the 3D floor is translucent
pub const EXFL_TRANSLUC: i32 = 1 << 5;
// a liquid or other thin surface
pub const EXFL_THIN: i32 = 1 << 6;

/// One 3D floor inside a sector, defined by a special linedef whose
/// right sidedef lives in the dummy control sector.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraFloor {
    pub ld: usize,
    pub sd: usize,
    pub flags: i32,
}

#[derive(Debug, Clone)]
pub struct SectorFloors {
    /// BOOM 242 style fake floor/ceiling: the dummy sector supplying
    /// the heights, or -1.
    pub heightsec: i32,

    pub extra_floors: Vec<ExtraFloor>,
}

impl Default for SectorFloors {
    fn default() -> Self {
        SectorFloors {
            heightsec: -1,
            extra_floors: Vec::new(),
        }
    }
}

impl SectorFloors {
    fn clear(&mut self) {
        self.heightsec = -1;
        self.extra_floors.clear();
    }
}

#[derive(Debug, Clone)]
struct SectorInfo {
    // these are < 0 when the sector has no lines
    first_line: i32,
    last_line: i32,

    // junk when the sector has no lines
    bound_x1: f64,
    bound_y1: f64,
    bound_x2: f64,
    bound_y2: f64,

    sub: Arc<SectorSubdivision>,

    floors: SectorFloors,

    // whether polygons have been built for this sector
    built: bool,
}

impl Default for SectorInfo {
    fn default() -> Self {
        SectorInfo {
            first_line: -1,
            last_line: -1,
            bound_x1: 32767.0,
            bound_y1: 32767.0,
            bound_x2: -32767.0,
            bound_y2: -32767.0,
            sub: Arc::new(SectorSubdivision::default()),
            floors: SectorFloors::default(),
            built: false,
        }
    }
}

impl SectorInfo {
    fn clear(&mut self) {
        *self = SectorInfo::default();
    }

    fn add_line(&mut self, n: usize) {
        let n = n as i32;
        if self.first_line < 0 || self.first_line > n {
            self.first_line = n;
        }
        if self.last_line < n {
            self.last_line = n;
        }
    }

    fn add_vertex(&mut self, x: i32, y: i32) {
        self.bound_x1 = self.bound_x1.min(x as f64);
        self.bound_y1 = self.bound_y1.min(y as f64);
        self.bound_x2 = self.bound_x2.max(x as f64);
        self.bound_y2 = self.bound_y2.max(y as f64);
    }
}

/// Owner of all per-sector derived info.  Lives behind a lock in the
/// [`Document`]; use the free functions in this module to query it.
#[derive(Debug)]
pub struct SectorInfoCache {
    /// Sector count the cache was built for, -1 when invalid.
    total: i32,

    infos: Vec<SectorInfo>,
}

impl Default for SectorInfoCache {
    fn default() -> Self {
        SectorInfoCache {
            total: -1,
            infos: Vec::new(),
        }
    }
}

impl SectorInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throw everything away; the next query rebuilds from scratch.
    pub fn invalidate_all(&mut self) {
        self.total = -1;
    }

    fn update(&mut self, doc: &Document, config: &EditorConfig) {
        let num_sectors = doc.num_sectors() as i32;

        if self.total != num_sectors {
            self.total = num_sectors;
            self.infos.resize_with(num_sectors as usize, SectorInfo::default);
            self.rebuild(doc, config);
        }
    }

    fn rebuild(&mut self, doc: &Document, config: &EditorConfig) {
        trace!("rebuilding sector info cache for {} sectors", self.total);

        for info in self.infos.iter_mut() {
            info.clear();
        }

        let linedefs = doc.linedefs.read();
        let vertices = doc.vertices.read();
        let sidedefs = doc.sidedefs.read();
        let sectors = doc.sectors.read();

        for (n, line) in linedefs.iter().enumerate() {
            self.check_boom242(config, line.line_type, line.tag, line.right, &sidedefs, &sectors);
            self.check_extra_floor(config, n, line.line_type, line.tag, line.right, &sectors);

            for sd_num in [line.right, line.left] {
                if sd_num < 0 {
                    continue;
                }

                let sec = sidedefs[sd_num as usize].sector;
                if sec < 0 || sec as usize >= self.infos.len() {
                    continue;
                }

                let info = &mut self.infos[sec as usize];

                info.add_line(n);

                let s = &vertices[line.start];
                let e = &vertices[line.end];
                info.add_vertex(s.raw_x, s.raw_y);
                info.add_vertex(e.raw_x, e.raw_y);
            }
        }
    }

    fn check_boom242(
        &mut self,
        config: &EditorConfig,
        line_type: i32,
        tag: i32,
        right: i32,
        sidedefs: &[Arc<crate::map::SideDef>],
        sectors: &[Arc<crate::map::Sector>],
    ) {
        if !(config.boom_gen_types && (line_type == 242 || line_type == 280)) {
            return;
        }

        if tag <= 0 || right < 0 {
            return;
        }

        let dummy_sec = sidedefs[right as usize].sector;

        for (n, sector) in sectors.iter().enumerate() {
            if sector.tag == tag {
                self.infos[n].floors.heightsec = dummy_sec;
            }
        }
    }

    fn check_extra_floor(
        &mut self,
        config: &EditorConfig,
        ld_num: usize,
        line_type: i32,
        tag: i32,
        right: i32,
        sectors: &[Arc<crate::map::Sector>],
    ) {
        if tag <= 0 || right < 0 {
            return;
        }

        let mut flags = -1;

        // EDGE style
        if config.extra_floor_styles & 1 != 0 {
            match line_type {
                400 => flags = 0,
                401 => flags = EXFL_UPPER,
                402 => flags = EXFL_LOWER,
                // liquids
                403..=408 => flags = EXFL_THIN,
                413..=417 => flags = EXFL_THIN,
                _ => {}
            }
        }

        // Legacy style
        if config.extra_floor_styles & 2 != 0 {
            match line_type {
                281 | 289 | 300 => flags = 0,
                // liquids
                301 | 304 => flags = EXFL_THIN,
                // invisible floor
                306 => flags = 0,
                _ => {}
            }
        }

        if flags < 0 {
            return;
        }

        let ef = ExtraFloor {
            ld: ld_num,
            sd: right as usize,
            flags,
        };

        for (n, sector) in sectors.iter().enumerate() {
            if sector.tag == tag {
                self.infos[n].floors.extra_floors.push(ef.clone());
            }
        }
    }
}

// Build the edge list for one sector and run the sweep.
fn subdivide_sector(doc: &Document, num: usize, info: &SectorInfo) -> SectorSubdivision {
    let mut sub = SectorSubdivision::default();

    if info.first_line < 0 {
        return sub;
    }

    let linedefs = doc.linedefs.read();
    let vertices = doc.vertices.read();
    let sidedefs = doc.sidedefs.read();

    let what_sector = |sd: i32| -> i32 {
        if sd < 0 {
            -1
        } else {
            sidedefs[sd as usize].sector
        }
    };

    let mut edgelist: Vec<SectorEdge> = Vec::new();

    for n in info.first_line as usize..=info.last_line as usize {
        let line = &linedefs[n];

        let right_sec = what_sector(line.right);
        let left_sec = what_sector(line.left);

        if right_sec != num as i32 && left_sec != num as i32 {
            continue;
        }

        // self-referencing lines contribute nothing to the boundary
        if left_sec == right_sec {
            continue;
        }

        let mut x1 = vertices[line.start].raw_x;
        let mut y1 = vertices[line.start].raw_y;
        let mut x2 = vertices[line.end].raw_x;
        let mut y2 = vertices[line.end].raw_y;

        // purely horizontal lines never cross a sweep row
        if y1 == y2 {
            continue;
        }

        let mut flipped = false;

        if y1 > y2 {
            std::mem::swap(&mut x1, &mut x2);
            std::mem::swap(&mut y1, &mut y2);
            flipped = true;
        }

        let mut is_right = right_sec == num as i32;
        if flipped {
            is_right = !is_right;
        }

        edgelist.push(SectorEdge {
            x1,
            y1,
            x2,
            y2,
            side: if is_right { Side::Right } else { Side::Left },
            line_right: line.right,
            cmp_x: 0.0,
        });
    }

    edgelist.sort_by_key(|e| e.y1);

    sweep_edges(edgelist, &mut sub);

    sub
}

/// The trapezoid subdivision of a sector, building it only when the
/// cached one is stale or missing.  Repeated queries on unchanged
/// geometry return the same shared allocation.
pub fn polygons_for_sector(
    doc: &Document,
    config: &EditorConfig,
    num: usize,
) -> Arc<SectorSubdivision> {
    let mut cache = doc.subdiv.write();
    cache.update(doc, config);

    if !cache.infos[num].built {
        let sub = subdivide_sector(doc, num, &cache.infos[num]);
        cache.infos[num].sub = Arc::new(sub);
        cache.infos[num].built = true;
    }

    Arc::clone(&cache.infos[num].sub)
}

/// The 3D-floor info scanned for a sector.
pub fn floors_for_sector(doc: &Document, config: &EditorConfig, num: usize) -> SectorFloors {
    let mut cache = doc.subdiv.write();
    cache.update(doc, config);

    cache.infos[num].floors.clone()
}

/// Whether any part of the sector's bounding box overlaps the given
/// map-space rectangle.
pub fn sector_on_screen(
    doc: &Document,
    config: &EditorConfig,
    num: usize,
    map_lx: f64,
    map_ly: f64,
    map_hx: f64,
    map_hy: f64,
) -> bool {
    let mut cache = doc.subdiv.write();
    cache.update(doc, config);

    let info = &cache.infos[num];

    !(info.bound_x1 > map_hx
        || info.bound_x2 < map_lx
        || info.bound_y1 > map_hy
        || info.bound_y2 < map_ly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{LineDef, Sector, SideDef};
    use assert_approx_eq::assert_approx_eq;

    fn new_sector(doc: &Document, tag: i32) -> usize {
        doc.add_sector(Sector::new(
            0,
            128,
            "FLAT1".into(),
            "CEIL1".into(),
            160,
            0,
            tag,
        ))
    }

    // clockwise square with right sidedefs referencing `sec`
    fn sector_square(doc: &Document, sec: usize, x: i32, y: i32, size: i32) {
        let a = doc.add_vertex(x, y);
        let b = doc.add_vertex(x, y + size);
        let c = doc.add_vertex(x + size, y + size);
        let d = doc.add_vertex(x + size, y);

        for (s, e) in [(a, b), (b, c), (c, d), (d, a)] {
            let sd = doc.add_sidedef(SideDef::new(
                0,
                0,
                "-".into(),
                "-".into(),
                "WALL1".into(),
                sec as i32,
            ));
            let mut line = LineDef::new(s, e);
            line.right = sd as i32;
            doc.add_linedef(line);
        }
    }

    fn polygon_area(p: &crate::subdiv::SectorPolygon) -> f64 {
        let mut sum = 0.0;
        for i in 0..p.count {
            let j = (i + 1) % p.count;
            sum += p.mx[i] * p.my[j] - p.mx[j] * p.my[i];
        }
        sum.abs() / 2.0
    }

    #[test]
    fn test_square_sector_is_one_trapezoid() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = new_sector(&doc, 0);
        sector_square(&doc, sec, 0, 0, 128);

        let sub = polygons_for_sector(&doc, &config, sec);

        assert_eq!(sub.polygons.len(), 1);
        assert_eq!(sub.polygons[0].count, 4);
        assert_approx_eq!(polygon_area(&sub.polygons[0]), 128.0 * 128.0);
    }

    #[test]
    fn test_cache_hit_returns_same_allocation() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = new_sector(&doc, 0);
        sector_square(&doc, sec, 0, 0, 128);

        let first = polygons_for_sector(&doc, &config, sec);
        let second = polygons_for_sector(&doc, &config, sec);

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_edit_invalidates_cache() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = new_sector(&doc, 0);
        sector_square(&doc, sec, 0, 0, 128);

        let before = polygons_for_sector(&doc, &config, sec);

        // stretch the square to 128x256
        doc.move_vertex(1, 0, 256);
        doc.move_vertex(2, 128, 256);

        let after = polygons_for_sector(&doc, &config, sec);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_approx_eq!(polygon_area(&after.polygons[0]), 128.0 * 256.0);
    }

    #[test]
    fn test_sector_with_hole() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = new_sector(&doc, 0);
        sector_square(&doc, sec, 0, 0, 256);

        // a square pillar: counterclockwise so the right sides face
        // outward into the sector
        let a = doc.add_vertex(96, 96);
        let d = doc.add_vertex(160, 96);
        let c = doc.add_vertex(160, 160);
        let b = doc.add_vertex(96, 160);

        for (s, e) in [(a, d), (d, c), (c, b), (b, a)] {
            let sd = doc.add_sidedef(SideDef::new(
                0,
                0,
                "-".into(),
                "-".into(),
                "WALL1".into(),
                sec as i32,
            ));
            let mut line = LineDef::new(s, e);
            line.right = sd as i32;
            doc.add_linedef(line);
        }

        let sub = polygons_for_sector(&doc, &config, sec);

        // the hole is excluded from the covered area
        let total: f64 = sub.polygons.iter().map(polygon_area).sum();
        assert_approx_eq!(total, 256.0 * 256.0 - 64.0 * 64.0);
    }

    #[test]
    fn test_sector_with_no_lines() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = new_sector(&doc, 0);

        let sub = polygons_for_sector(&doc, &config, sec);
        assert!(sub.polygons.is_empty());
    }

    #[test]
    fn test_sector_on_screen() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let sec = new_sector(&doc, 0);
        sector_square(&doc, sec, 0, 0, 128);

        assert!(sector_on_screen(&doc, &config, sec, -64.0, -64.0, 64.0, 64.0));
        assert!(!sector_on_screen(&doc, &config, sec, 500.0, 500.0, 600.0, 600.0));
    }

    #[test]
    fn test_boom242_heightsec() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let target = new_sector(&doc, 5);
        sector_square(&doc, target, 0, 0, 128);

        // control linedef: type 242, tag 5, right side in a dummy
        // sector off to the side
        let dummy = new_sector(&doc, 0);
        let a = doc.add_vertex(1000, 0);
        let b = doc.add_vertex(1064, 0);
        let sd = doc.add_sidedef(SideDef::new(
            0,
            0,
            "-".into(),
            "-".into(),
            "WALL1".into(),
            dummy as i32,
        ));
        let mut line = LineDef::new(a, b);
        line.right = sd as i32;
        line.line_type = 242;
        line.tag = 5;
        doc.add_linedef(line);

        let floors = floors_for_sector(&doc, &config, target);
        assert_eq!(floors.heightsec, dummy as i32);

        let other = floors_for_sector(&doc, &config, dummy);
        assert_eq!(other.heightsec, -1);
    }

    #[test]
    fn test_extra_floor_scan() {
        let doc = Document::new();
        let config = EditorConfig::default();

        let target = new_sector(&doc, 7);
        sector_square(&doc, target, 0, 0, 128);

        let dummy = new_sector(&doc, 0);
        let a = doc.add_vertex(1000, 0);
        let b = doc.add_vertex(1064, 0);
        let sd = doc.add_sidedef(SideDef::new(
            0,
            0,
            "-".into(),
            "-".into(),
            "WALL1".into(),
            dummy as i32,
        ));
        let mut line = LineDef::new(a, b);
        line.right = sd as i32;
        line.line_type = 301; // Legacy translucent liquid
        line.tag = 7;
        let ld = doc.add_linedef(line);

        let floors = floors_for_sector(&doc, &config, target);
        assert_eq!(floors.extra_floors.len(), 1);
        assert_eq!(floors.extra_floors[0].ld, ld);
        assert_eq!(floors.extra_floors[0].sd, sd);
        assert_eq!(floors.extra_floors[0].flags, EXFL_THIN);
    }
}
