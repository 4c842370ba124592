//! Uniform grid broad-phase
//!
//! The arena is divided into square cells. An entity is registered in every
//! cell its bounding square touches, so two entities can only collide if
//! they share a cell. Positions outside the arena clamp to the border cells,
//! so nothing is ever dropped.

use super::SpatialQuery;
use crate::ecs::Entity;
use crate::foundation::math::{vec2, Vec2};
use std::any::Any;
use std::collections::{BTreeSet, HashMap};

/// Most cells a grid may allocate; larger arenas get coarser cells
pub const MAX_CELLS: usize = 1 << 20;

/// Inclusive rectangle of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// First column
    pub min_x: usize,
    /// First row
    pub min_y: usize,
    /// Last column
    pub max_x: usize,
    /// Last row
    pub max_y: usize,
}

impl CellRange {
    /// Number of cells covered
    pub fn cell_count(&self) -> usize {
        (self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    position: Vec2,
    radius: f32,
    cells: CellRange,
}

/// Uniform grid over a rectangular arena
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    origin: Vec2,
    centered: bool,
    width: f32,
    height: f32,
    cell_size: f32,
    columns: usize,
    rows: usize,
    cells: Vec<Vec<Entity>>,
    placements: HashMap<Entity, Placement>,
}

impl SpatialGrid {
    /// Grid covering a `width` x `height` arena centred on the origin
    ///
    /// A non-positive `cell_size` falls back to one cell spanning the arena.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let mut grid = Self::with_origin(vec2(-width * 0.5, -height * 0.5), width, height, cell_size);
        grid.centered = true;
        grid
    }

    /// Grid whose lower-left corner sits at `origin`
    ///
    /// Resizing keeps the origin in place.
    pub fn with_origin(origin: Vec2, width: f32, height: f32, cell_size: f32) -> Self {
        let width = finite_extent(width);
        let height = finite_extent(height);
        let requested = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            width.max(height).max(1.0)
        };
        let cell_size = fit_cell_size(width, height, requested);
        if cell_size > requested {
            log::warn!(
                "SpatialGrid {width}x{height}: cell size {requested} needs more than {MAX_CELLS} cells, using {cell_size}"
            );
        }

        let columns = cells_along(width, cell_size);
        let rows = cells_along(height, cell_size);
        log::debug!("SpatialGrid {width}x{height} with {columns}x{rows} cells of {cell_size}");

        Self {
            origin,
            centered: false,
            width,
            height,
            cell_size,
            columns,
            rows,
            cells: vec![Vec::new(); columns * rows],
            placements: HashMap::new(),
        }
    }

    /// Side length of one cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of columns and rows
    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Covered area
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Cells `entity` is registered in
    pub fn cells_for(&self, entity: Entity) -> Option<CellRange> {
        self.placements.get(&entity).map(|p| p.cells)
    }

    /// Number of cells holding at least one entity
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Entities registered in the cell at `(column, row)`
    pub fn cell(&self, column: usize, row: usize) -> &[Entity] {
        if column >= self.columns || row >= self.rows {
            return &[];
        }
        &self.cells[row * self.columns + column]
    }

    /// Broad-phase candidates for `entity`
    pub fn get_potential_collisions(&self, entity: Entity) -> Vec<Entity> {
        let Some(placement) = self.placements.get(&entity) else {
            return Vec::new();
        };
        let mut candidates = self.entities_in(placement.cells);
        candidates.remove(&entity);
        candidates.into_iter().collect()
    }

    /// Cell range covering the square `[min, max]`, clamped to the grid
    pub fn cell_range(&self, min: Vec2, max: Vec2) -> CellRange {
        CellRange {
            min_x: self.column_of(min.x),
            min_y: self.row_of(min.y),
            max_x: self.column_of(max.x),
            max_y: self.row_of(max.y),
        }
    }

    fn column_of(&self, x: f32) -> usize {
        cell_coord(x - self.origin.x, self.cell_size, self.columns)
    }

    fn row_of(&self, y: f32) -> usize {
        cell_coord(y - self.origin.y, self.cell_size, self.rows)
    }

    fn entities_in(&self, range: CellRange) -> BTreeSet<Entity> {
        let mut found = BTreeSet::new();
        for row in range.min_y..=range.max_y {
            for column in range.min_x..=range.max_x {
                found.extend(self.cells[row * self.columns + column].iter().copied());
            }
        }
        found
    }
}

impl SpatialQuery for SpatialGrid {
    fn insert(&mut self, entity: Entity, position: Vec2, radius: f32) {
        if self.placements.contains_key(&entity) {
            self.remove(entity);
        }

        let radius = radius.max(0.0);
        let extent = vec2(radius, radius);
        let cells = self.cell_range(position - extent, position + extent);
        for row in cells.min_y..=cells.max_y {
            for column in cells.min_x..=cells.max_x {
                self.cells[row * self.columns + column].push(entity);
            }
        }
        self.placements.insert(
            entity,
            Placement {
                position,
                radius,
                cells,
            },
        );
    }

    fn remove(&mut self, entity: Entity) {
        let Some(placement) = self.placements.remove(&entity) else {
            return;
        };
        let cells = placement.cells;
        for row in cells.min_y..=cells.max_y {
            for column in cells.min_x..=cells.max_x {
                self.cells[row * self.columns + column].retain(|&e| e != entity);
            }
        }
    }

    fn query_nearby(&self, entity: Entity) -> Vec<Entity> {
        self.get_potential_collisions(entity)
    }

    fn query_region(&self, min: Vec2, max: Vec2) -> Vec<Entity> {
        self.entities_in(self.cell_range(min, max))
            .into_iter()
            .filter(|entity| {
                self.placements.get(entity).is_some_and(|p| {
                    p.position.x + p.radius >= min.x
                        && p.position.x - p.radius <= max.x
                        && p.position.y + p.radius >= min.y
                        && p.position.y - p.radius <= max.y
                })
            })
            .collect()
    }

    fn query_radius(&self, center: Vec2, radius: f32) -> Vec<Entity> {
        let extent = vec2(radius, radius);
        self.entities_in(self.cell_range(center - extent, center + extent))
            .into_iter()
            .filter(|entity| {
                self.placements.get(entity).is_some_and(|p| {
                    let reach = p.radius + radius;
                    (p.position - center).magnitude_squared() <= reach * reach
                })
            })
            .collect()
    }

    fn get_entity_data(&self, entity: Entity) -> Option<(Vec2, f32)> {
        self.placements.get(&entity).map(|p| (p.position, p.radius))
    }

    fn resize(&mut self, width: f32, height: f32) {
        *self = if self.centered {
            Self::new(width, height, self.cell_size)
        } else {
            Self::with_origin(self.origin, width, height, self.cell_size)
        };
    }

    fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.placements.clear();
    }

    fn entity_count(&self) -> usize {
        self.placements.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn cells_along(extent: f32, cell_size: f32) -> usize {
    ((extent / cell_size).ceil() as usize).max(1)
}

fn finite_extent(extent: f32) -> f32 {
    if extent.is_finite() {
        extent.max(0.0)
    } else {
        0.0
    }
}

/// Smallest power-of-two multiple of `cell_size` keeping the grid within `MAX_CELLS`
fn fit_cell_size(width: f32, height: f32, cell_size: f32) -> f32 {
    let mut size = cell_size;
    while cells_along(width, size).saturating_mul(cells_along(height, size)) > MAX_CELLS {
        size *= 2.0;
    }
    size
}

/// Cell index of `offset` along one axis, clamped into `[0, count)`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn cell_coord(offset: f32, cell_size: f32, count: usize) -> usize {
    let cell = (offset / cell_size).floor();
    if cell.is_nan() || cell <= 0.0 {
        0
    } else if cell >= count as f32 {
        count - 1
    } else {
        cell as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    #[test]
    fn test_dimensions_round_up() {
        let grid = SpatialGrid::new(800.0, 600.0, 50.0);
        assert_eq!(grid.dimensions(), (16, 12));

        let grid = SpatialGrid::new(810.0, 600.0, 100.0);
        assert_eq!(grid.dimensions(), (9, 6));
    }

    #[test]
    fn test_entity_spanning_cells() {
        let mut grid = SpatialGrid::with_origin(Vec2::zeros(), 400.0, 400.0, 100.0);
        grid.insert(e(1), vec2(100.0, 100.0), 10.0);

        assert_eq!(
            grid.cells_for(e(1)),
            Some(CellRange { min_x: 0, min_y: 0, max_x: 1, max_y: 1 })
        );
        assert_eq!(grid.occupied_cells(), 4);
    }

    #[test]
    fn test_potential_collisions_are_deduplicated() {
        let mut grid = SpatialGrid::with_origin(Vec2::zeros(), 400.0, 400.0, 100.0);
        grid.insert(e(1), vec2(100.0, 100.0), 10.0);
        grid.insert(e(2), vec2(105.0, 95.0), 10.0);
        grid.insert(e(3), vec2(350.0, 350.0), 5.0);

        assert_eq!(grid.get_potential_collisions(e(1)), vec![e(2)]);
        assert_eq!(grid.query_nearby(e(2)), vec![e(1)]);
        assert!(grid.query_nearby(e(3)).is_empty());
        assert!(grid.query_nearby(e(99)).is_empty());
    }

    #[test]
    fn test_out_of_bounds_clamps_to_border() {
        let mut grid = SpatialGrid::new(200.0, 200.0, 50.0);
        grid.insert(e(1), vec2(-5000.0, 5000.0), 1.0);
        grid.insert(e(2), vec2(-99.0, 99.0), 1.0);

        assert_eq!(
            grid.cells_for(e(1)),
            Some(CellRange { min_x: 0, min_y: 3, max_x: 0, max_y: 3 })
        );
        assert_eq!(grid.query_nearby(e(1)), vec![e(2)]);
    }

    #[test]
    fn test_reinsert_moves_entity() {
        let mut grid = SpatialGrid::with_origin(Vec2::zeros(), 400.0, 400.0, 100.0);
        grid.insert(e(1), vec2(50.0, 50.0), 1.0);
        grid.insert(e(1), vec2(350.0, 350.0), 1.0);

        assert_eq!(grid.entity_count(), 1);
        assert!(grid.cell(0, 0).is_empty());
        assert_eq!(grid.cell(3, 3), &[e(1)]);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut grid = SpatialGrid::new(400.0, 400.0, 100.0);
        grid.insert(e(1), Vec2::zeros(), 150.0);
        grid.insert(e(2), Vec2::zeros(), 1.0);

        grid.remove(e(1));
        assert_eq!(grid.entity_count(), 1);
        assert!(grid.query_nearby(e(2)).is_empty());

        grid.clear();
        assert_eq!(grid.entity_count(), 0);
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn test_region_and_radius_queries() {
        let mut grid = SpatialGrid::new(400.0, 400.0, 50.0);
        grid.insert(e(1), vec2(0.0, 0.0), 5.0);
        grid.insert(e(2), vec2(30.0, 0.0), 5.0);
        grid.insert(e(3), vec2(150.0, 150.0), 5.0);

        assert_eq!(grid.query_radius(Vec2::zeros(), 10.0), vec![e(1)]);
        assert_eq!(grid.query_radius(Vec2::zeros(), 25.0), vec![e(1), e(2)]);
        assert_eq!(
            grid.query_region(vec2(100.0, 100.0), vec2(200.0, 200.0)),
            vec![e(3)]
        );
        assert_eq!(grid.get_entity_data(e(2)), Some((vec2(30.0, 0.0), 5.0)));
    }

    #[test]
    fn test_resize_keeps_custom_origin() {
        let mut grid = SpatialGrid::with_origin(vec2(100.0, 100.0), 200.0, 200.0, 50.0);
        grid.resize(400.0, 400.0);

        grid.insert(e(1), vec2(110.0, 110.0), 1.0);
        assert_eq!(
            grid.cells_for(e(1)),
            Some(CellRange { min_x: 0, min_y: 0, max_x: 0, max_y: 0 })
        );
        grid.insert(e(2), vec2(480.0, 480.0), 1.0);
        assert_eq!(
            grid.cells_for(e(2)),
            Some(CellRange { min_x: 7, min_y: 7, max_x: 7, max_y: 7 })
        );
    }

    #[test]
    fn test_huge_arena_is_capped() {
        let mut grid = SpatialGrid::new(1.0e9, 1.0e9, 1.0);
        let (columns, rows) = grid.dimensions();

        assert!(columns * rows <= MAX_CELLS);
        assert!(grid.cell_size() > 1.0);

        grid.resize(f32::MAX, f32::MAX);
        let (columns, rows) = grid.dimensions();
        assert!(columns * rows <= MAX_CELLS);
    }

    #[test]
    fn test_resize() {
        let mut grid = SpatialGrid::new(100.0, 100.0, 50.0);
        grid.insert(e(1), Vec2::zeros(), 1.0);

        grid.resize(1000.0, 500.0);

        assert_eq!(grid.dimensions(), (20, 10));
        assert_eq!(grid.entity_count(), 0);
        assert_eq!(grid.size(), (1000.0, 500.0));
    }
}
