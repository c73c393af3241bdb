// src/document/document.rs

use crate::document::ObjType;
use crate::map::{LineDef, Sector, Side, SideDef, Thing, Vertex};
use crate::subdiv::SectorInfoCache;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::Arc;

/// The main document: flat arrays of map objects, referenced everywhere
/// by integer index (never by pointer), plus the sector-info cache.
///
/// The core never mutates geometry behind the caller's back: all edits
/// go through the mutation methods here (or the operations built on
/// them), which fire the cache invalidation the subdivision layer
/// depends on.  Cached indices must be treated as stale after any
/// structural change.
#[derive(Default)]
pub struct Document {
    pub things: Arc<RwLock<Vec<Arc<Thing>>>>,
    pub vertices: Arc<RwLock<Vec<Arc<Vertex>>>>,
    pub sectors: Arc<RwLock<Vec<Arc<Sector>>>>,
    pub sidedefs: Arc<RwLock<Vec<Arc<SideDef>>>>,
    pub linedefs: Arc<RwLock<Vec<Arc<LineDef>>>>,

    pub checksum: Arc<RwLock<u32>>,

    /// Per-sector derived info (line ranges, bounding boxes,
    /// subdivision polygons).  Owned here so there is no hidden
    /// singleton; see `subdiv::cache`.
    pub subdiv: Arc<RwLock<SectorInfoCache>>,
}

impl Document {
    /// Create a new empty Document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_objects(&self, obj_type: ObjType) -> usize {
        match obj_type {
            ObjType::Things => self.things.read().len(),
            ObjType::Linedefs => self.linedefs.read().len(),
            ObjType::Sidedefs => self.sidedefs.read().len(),
            ObjType::Vertices => self.vertices.read().len(),
            ObjType::Sectors => self.sectors.read().len(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.read().len()
    }
    pub fn num_linedefs(&self) -> usize {
        self.linedefs.read().len()
    }
    pub fn num_sidedefs(&self) -> usize {
        self.sidedefs.read().len()
    }
    pub fn num_sectors(&self) -> usize {
        self.sectors.read().len()
    }
    pub fn num_things(&self) -> usize {
        self.things.read().len()
    }

    // --- Object accessors (indices must be valid; a bad index is a
    //     programmer invariant violation, not a recoverable error) ---

    pub fn vertex(&self, n: usize) -> Arc<Vertex> {
        Arc::clone(&self.vertices.read()[n])
    }
    pub fn linedef(&self, n: usize) -> Arc<LineDef> {
        Arc::clone(&self.linedefs.read()[n])
    }
    pub fn sidedef(&self, n: usize) -> Arc<SideDef> {
        Arc::clone(&self.sidedefs.read()[n])
    }
    pub fn sector(&self, n: usize) -> Arc<Sector> {
        Arc::clone(&self.sectors.read()[n])
    }
    pub fn thing(&self, n: usize) -> Arc<Thing> {
        Arc::clone(&self.things.read()[n])
    }

    /// Both endpoint coordinates of a linedef: `(x1, y1, x2, y2)`.
    pub fn line_coords(&self, line: &LineDef) -> (i32, i32, i32, i32) {
        let vertices = self.vertices.read();
        let s = &vertices[line.start];
        let e = &vertices[line.end];
        (s.raw_x, s.raw_y, e.raw_x, e.raw_y)
    }

    // --- Geometry mutation methods ---

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&self, x: i32, y: i32) -> usize {
        let mut vertices = self.vertices.write();
        vertices.push(Arc::new(Vertex::new(x, y)));
        vertices.len() - 1
    }

    /// Moves a vertex to new coordinates and invalidates the cache.
    pub fn move_vertex(&self, vertex_id: usize, new_x: i32, new_y: i32) {
        {
            let mut vertices = self.vertices.write();
            let vertex = Arc::make_mut(&mut vertices[vertex_id]);
            vertex.raw_x = new_x;
            vertex.raw_y = new_y;
        }
        self.on_vertex_moved();
    }

    /// Adds a linedef and returns its index.
    pub fn add_linedef(&self, line: LineDef) -> usize {
        let idx = {
            let mut linedefs = self.linedefs.write();
            linedefs.push(Arc::new(line));
            linedefs.len() - 1
        };
        self.on_linedef_side_changed();
        idx
    }

    /// Adds a sidedef and returns its index.
    pub fn add_sidedef(&self, side: SideDef) -> usize {
        let idx = {
            let mut sidedefs = self.sidedefs.write();
            sidedefs.push(Arc::new(side));
            sidedefs.len() - 1
        };
        self.on_sidedef_sector_changed();
        idx
    }

    /// Adds a sector and returns its index.
    pub fn add_sector(&self, sector: Sector) -> usize {
        let idx = {
            let mut sectors = self.sectors.write();
            sectors.push(Arc::new(sector));
            sectors.len() - 1
        };
        self.on_sector_count_changed();
        idx
    }

    /// Adds a thing and returns its index.
    pub fn add_thing(&self, thing: Thing) -> usize {
        let mut things = self.things.write();
        things.push(Arc::new(thing));
        things.len() - 1
    }

    /// Attach (or detach, with -1) a sidedef on one side of a linedef.
    pub fn set_linedef_side(&self, ld: usize, side: Side, sd: i32) {
        {
            let mut linedefs = self.linedefs.write();
            Arc::make_mut(&mut linedefs[ld]).set_side_index(side, sd);
        }
        self.on_linedef_side_changed();
    }

    /// Retarget a sidedef's sector reference.
    pub fn set_sidedef_sector(&self, sd: usize, sector: i32) {
        {
            let mut sidedefs = self.sidedefs.write();
            Arc::make_mut(&mut sidedefs[sd]).sector = sector;
        }
        self.on_sidedef_sector_changed();
    }

    /// Change a sector's floor and ceiling heights.
    pub fn set_sector_heights(&self, sec: usize, floor_h: i32, ceil_h: i32) {
        {
            let mut sectors = self.sectors.write();
            let s = Arc::make_mut(&mut sectors[sec]);
            s.floor_height = floor_h;
            s.ceiling_height = ceil_h;
        }
        self.on_sector_height_changed();
    }

    // Generic in-place mutators for non-structural field tweaks
    // (textures, offsets, flags).  These do NOT invalidate the cache;
    // use the named setters above for anything the cache depends on.

    pub fn mutate_linedef(&self, n: usize, f: impl FnOnce(&mut LineDef)) {
        let mut linedefs = self.linedefs.write();
        f(Arc::make_mut(&mut linedefs[n]));
    }

    pub fn mutate_sidedef(&self, n: usize, f: impl FnOnce(&mut SideDef)) {
        let mut sidedefs = self.sidedefs.write();
        f(Arc::make_mut(&mut sidedefs[n]));
    }

    pub fn mutate_sector(&self, n: usize, f: impl FnOnce(&mut Sector)) {
        let mut sectors = self.sectors.write();
        f(Arc::make_mut(&mut sectors[n]));
    }

    pub fn mutate_thing(&self, n: usize, f: impl FnOnce(&mut Thing)) {
        let mut things = self.things.write();
        f(Arc::make_mut(&mut things[n]));
    }

    // --- Deletion with compact-and-reindex ---
    //
    // Deleting an object shifts every higher index down by one, so all
    // referrers must be renumbered.  Callers delete dependents first
    // (e.g. the linedefs using a vertex) -- these methods only fix up
    // indices, they do not cascade.

    /// Removes a vertex; linedef start/end indices above it are shifted.
    pub fn delete_vertex(&self, vertex_id: usize) {
        {
            let mut vertices = self.vertices.write();
            assert!(vertex_id < vertices.len());
            vertices.remove(vertex_id);
        }
        {
            let mut linedefs = self.linedefs.write();
            for line_arc in linedefs.iter_mut() {
                debug_assert!(!line_arc.uses_vertex(vertex_id));
                let line = Arc::make_mut(line_arc);
                if line.start > vertex_id {
                    line.start -= 1;
                }
                if line.end > vertex_id {
                    line.end -= 1;
                }
            }
        }
        self.on_vertex_moved();
    }

    /// Removes a linedef.  Nothing references linedefs by index, so no
    /// renumbering is needed beyond the shift itself.
    pub fn delete_linedef(&self, linedef_id: usize) {
        {
            let mut linedefs = self.linedefs.write();
            assert!(linedef_id < linedefs.len());
            linedefs.remove(linedef_id);
        }
        self.on_linedef_side_changed();
    }

    /// Removes a sidedef; linedef right/left references are renumbered.
    pub fn delete_sidedef(&self, sidedef_id: usize) {
        {
            let mut sidedefs = self.sidedefs.write();
            assert!(sidedef_id < sidedefs.len());
            sidedefs.remove(sidedef_id);
        }
        {
            let mut linedefs = self.linedefs.write();
            let sd = sidedef_id as i32;
            for line_arc in linedefs.iter_mut() {
                if line_arc.right == sd || line_arc.left == sd || line_arc.right > sd
                    || line_arc.left > sd
                {
                    let line = Arc::make_mut(line_arc);
                    if line.right == sd {
                        line.right = -1;
                    } else if line.right > sd {
                        line.right -= 1;
                    }
                    if line.left == sd {
                        line.left = -1;
                    } else if line.left > sd {
                        line.left -= 1;
                    }
                }
            }
        }
        self.on_linedef_side_changed();
    }

    /// Removes a sector; sidedef sector references are renumbered.
    /// Sidedefs still referencing the deleted sector must have been
    /// dealt with by the caller.
    pub fn delete_sector(&self, sector_id: usize) {
        {
            let mut sectors = self.sectors.write();
            assert!(sector_id < sectors.len());
            sectors.remove(sector_id);
        }
        {
            let mut sidedefs = self.sidedefs.write();
            let sec = sector_id as i32;
            for side_arc in sidedefs.iter_mut() {
                debug_assert!(side_arc.sector != sec);
                if side_arc.sector > sec {
                    Arc::make_mut(side_arc).sector -= 1;
                }
            }
        }
        self.on_sector_count_changed();
    }

    /// Removes a thing.
    pub fn delete_thing(&self, thing_id: usize) {
        let mut things = self.things.write();
        assert!(thing_id < things.len());
        things.remove(thing_id);
    }

    // --- Cache invalidation notifications ---
    //
    // Every structurally-significant change funnels into a wholesale
    // invalidation; the cache rebuilds lazily on the next query.

    pub fn on_vertex_moved(&self) {
        self.subdiv.write().invalidate_all();
    }
    pub fn on_sidedef_sector_changed(&self) {
        self.subdiv.write().invalidate_all();
    }
    pub fn on_linedef_side_changed(&self) {
        self.subdiv.write().invalidate_all();
    }
    pub fn on_sector_height_changed(&self) {
        self.subdiv.write().invalidate_all();
    }
    pub fn on_sector_count_changed(&self) {
        self.subdiv.write().invalidate_all();
    }

    // --- Linedef / sector relationship helpers ---

    /// Computes the length of a linedef.
    pub fn calc_length(&self, line: &LineDef) -> f64 {
        let (x1, y1, x2, y2) = self.line_coords(line);
        ((x1 - x2) as f64).hypot((y1 - y2) as f64)
    }

    /// Returns true if the linedef has zero length.
    pub fn is_zero_length(&self, line: &LineDef) -> bool {
        let (x1, y1, x2, y2) = self.line_coords(line);
        x1 == x2 && y1 == y2
    }

    /// Returns true if the linedef touches the given coordinate.
    pub fn touches_coord(&self, line: &LineDef, tx: i32, ty: i32) -> bool {
        let vertices = self.vertices.read();
        vertices[line.start].matches(tx, ty) || vertices[line.end].matches(tx, ty)
    }

    /// Returns true if the linedef touches the given sector.
    pub fn touches_sector(&self, line: &LineDef, sec_num: i32) -> bool {
        let sidedefs = self.sidedefs.read();
        for sd in [line.right, line.left] {
            if sd >= 0 {
                if let Some(side) = sidedefs.get(sd as usize) {
                    if side.sector == sec_num {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Returns true if the linedef is horizontal.
    pub fn is_horizontal(&self, line: &LineDef) -> bool {
        let vertices = self.vertices.read();
        vertices[line.start].raw_y == vertices[line.end].raw_y
    }

    /// Returns true if the linedef is vertical.
    pub fn is_vertical(&self, line: &LineDef) -> bool {
        let vertices = self.vertices.read();
        vertices[line.start].raw_x == vertices[line.end].raw_x
    }

    /// Returns true if the linedef's sidedefs reference the same sector.
    pub fn is_self_ref(&self, line: &LineDef) -> bool {
        if line.left >= 0 && line.right >= 0 {
            let sidedefs = self.sidedefs.read();
            if let (Some(left), Some(right)) = (
                sidedefs.get(line.left as usize),
                sidedefs.get(line.right as usize),
            ) {
                return left.sector == right.sector;
            }
        }
        false
    }

    /// The sector index on the given side of a linedef, or -1.
    pub fn get_sector_id(&self, line: &LineDef, side: Side) -> i32 {
        let sd = line.side_index(side);
        if sd < 0 {
            return -1;
        }
        let sidedefs = self.sidedefs.read();
        sidedefs.get(sd as usize).map_or(-1, |s| s.sector)
    }

    /// Like [`Document::get_sector_id`], looking the linedef up by index.
    pub fn what_sector(&self, ld: usize, side: Side) -> i32 {
        let line = self.linedef(ld);
        self.get_sector_id(&line, side)
    }

    /// Count the linedefs that touch a vertex.
    pub fn vertex_how_many_linedefs(&self, v: usize) -> usize {
        self.linedefs
            .read()
            .iter()
            .filter(|l| l.uses_vertex(v))
            .count()
    }

    /// Bounding box of all vertices, or None when the map is empty.
    pub fn calc_bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let vertices = self.vertices.read();
        if vertices.is_empty() {
            return None;
        }

        let mut x1 = i32::MAX;
        let mut y1 = i32::MAX;
        let mut x2 = i32::MIN;
        let mut y2 = i32::MIN;

        for v in vertices.iter() {
            x1 = x1.min(v.raw_x);
            y1 = y1.min(v.raw_y);
            x2 = x2.max(v.raw_x);
            y2 = y2.max(v.raw_y);
        }

        Some((x1, y1, x2, y2))
    }

    /// Computes a checksum over all geometry.
    pub fn get_level_checksum(&self) -> u32 {
        let mut checksum = 0u32;
        {
            let things = self.things.read();
            checksum = checksum.wrapping_add(
                things
                    .par_iter()
                    .map(|thing| checksum_thing(thing))
                    .sum::<u32>(),
            );
        }
        {
            let vertices = self.vertices.read();
            checksum = checksum.wrapping_add(
                vertices
                    .par_iter()
                    .map(|vertex| checksum_vertex(vertex))
                    .sum::<u32>(),
            );
        }
        {
            let sectors = self.sectors.read();
            checksum = checksum.wrapping_add(
                sectors
                    .par_iter()
                    .map(|sector| checksum_sector(sector))
                    .sum::<u32>(),
            );
        }
        {
            let sidedefs = self.sidedefs.read();
            checksum = checksum.wrapping_add(
                sidedefs
                    .par_iter()
                    .map(|side| checksum_sidedef(side))
                    .sum::<u32>(),
            );
        }
        {
            let linedefs = self.linedefs.read();
            checksum = checksum.wrapping_add(
                linedefs
                    .par_iter()
                    .map(|line| checksum_linedef(line))
                    .sum::<u32>(),
            );
        }
        *self.checksum.write() = checksum;
        checksum
    }

    /// Clears all geometry.
    pub fn clear(&self) {
        self.things.write().clear();
        self.vertices.write().clear();
        self.sectors.write().clear();
        self.sidedefs.write().clear();
        self.linedefs.write().clear();
        *self.checksum.write() = 0;
        self.subdiv.write().invalidate_all();
    }
}

// --- Checksum helper functions ---

fn add_crc(crc: &mut u32, value: i32) {
    *crc = crc.wrapping_add(value as u32);
}

fn checksum_thing(thing: &Thing) -> u32 {
    let mut crc = 0u32;
    add_crc(&mut crc, thing.raw_x);
    add_crc(&mut crc, thing.raw_y);
    add_crc(&mut crc, thing.angle);
    add_crc(&mut crc, thing.thing_type);
    add_crc(&mut crc, thing.options);
    crc
}

fn checksum_vertex(vertex: &Vertex) -> u32 {
    let mut crc = 0u32;
    add_crc(&mut crc, vertex.raw_x);
    add_crc(&mut crc, vertex.raw_y);
    crc
}

fn checksum_sector(sector: &Sector) -> u32 {
    let mut crc = 0u32;
    add_crc(&mut crc, sector.floor_height);
    add_crc(&mut crc, sector.ceiling_height);
    add_crc(&mut crc, sector.light);
    add_crc(&mut crc, sector.r#type);
    add_crc(&mut crc, sector.tag);
    for byte in sector.floor_tex.as_bytes() {
        add_crc(&mut crc, *byte as i32);
    }
    for byte in sector.ceiling_tex.as_bytes() {
        add_crc(&mut crc, *byte as i32);
    }
    crc
}

fn checksum_sidedef(sidedef: &SideDef) -> u32 {
    let mut crc = 0u32;
    add_crc(&mut crc, sidedef.x_offset);
    add_crc(&mut crc, sidedef.y_offset);
    for byte in sidedef.upper_tex.as_bytes() {
        add_crc(&mut crc, *byte as i32);
    }
    for byte in sidedef.lower_tex.as_bytes() {
        add_crc(&mut crc, *byte as i32);
    }
    for byte in sidedef.mid_tex.as_bytes() {
        add_crc(&mut crc, *byte as i32);
    }
    add_crc(&mut crc, sidedef.sector);
    crc
}

fn checksum_linedef(linedef: &LineDef) -> u32 {
    let mut crc = 0u32;
    add_crc(&mut crc, linedef.flags);
    add_crc(&mut crc, linedef.line_type);
    add_crc(&mut crc, linedef.tag);
    add_crc(&mut crc, linedef.start as i32);
    add_crc(&mut crc, linedef.end as i32);
    add_crc(&mut crc, linedef.right);
    add_crc(&mut crc, linedef.left);
    crc
}
