//! Procedural terrain: land/ocean classification and resource density.
//!
//! Algorithm:
//! 1. Sum four octaves of Perlin noise (weights 0.5, 0.25, 0.125, 0.0625,
//!    normalized by 0.9375) and threshold against `ocean_threshold`
//! 2. For land cells, take the max of three sharpened noise layers to get
//!    sparse rich patches over a low-contrast base
//! 3. Smooth coastlines with a 3-pass cellular automaton over the toroidal
//!    8-neighborhood
//!
//! All lookups wrap: column and row indices are taken modulo the grid size.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::terrain::*;
use crate::vector::Vec2;

/// Octave (frequency multiplier, coordinate offset, weight).
const LAND_OCTAVES: [(f64, f64, f64); 4] = [
    (1.0, 0.0, 0.5),
    (2.0, 500.0, 0.25),
    (4.0, 1000.0, 0.125),
    (8.0, 2000.0, 0.0625),
];
const LAND_WEIGHT_SUM: f64 = 0.9375;

/// Resource layer (frequency multiplier, offset, exponent, amplitude).
const RESOURCE_LAYERS: [(f64, f64, f64, f64); 3] = [
    (1.0, 3000.0, 1.5, 1.0),
    (3.0, 5000.0, 2.0, 1.2),
    (5.0, 7000.0, 3.0, 1.5),
];

/// One grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainCell {
    pub is_land: bool,
    /// 0.0 (barren) to 1.0 (rich). Always 0 for ocean.
    pub resource_density: f32,
}

impl TerrainCell {
    pub const OCEAN: Self = Self {
        is_land: false,
        resource_density: 0.0,
    };
}

/// Generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    pub cell_size: f32,
    pub ocean_threshold: f32,
    pub noise_scale: f64,
    pub resource_noise_scale: f64,
    pub smoothing_iterations: usize,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            cell_size: DEFAULT_CELL_SIZE,
            ocean_threshold: DEFAULT_OCEAN_THRESHOLD,
            noise_scale: NOISE_SCALE,
            resource_noise_scale: RESOURCE_NOISE_SCALE,
            smoothing_iterations: SMOOTHING_ITERATIONS,
        }
    }
}

impl TerrainParams {
    /// Grid dimensions covering a `width` x `height` world (at least 1x1).
    pub fn grid_size(&self, width: f32, height: f32) -> (usize, usize) {
        let cell = self.cell_size.max(f32::EPSILON);
        let cols = (width / cell).floor().max(1.0) as usize;
        let rows = (height / cell).floor().max(1.0) as usize;
        (cols, rows)
    }
}

/// Land/ocean grid with per-cell resource density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    cols: usize,
    rows: usize,
    cell_size: f32,
    seed: u32,
    /// Row-major: index = row * cols + col.
    cells: Vec<TerrainCell>,
}

/// Generate a grid with the default cell size and noise scales.
pub fn generate(seed: u32, cols: usize, rows: usize, ocean_threshold: f32) -> TerrainGrid {
    let params = TerrainParams {
        seed,
        ocean_threshold,
        ..Default::default()
    };
    TerrainGrid::generate_with(&params, cols, rows)
}

/// Map Perlin output (roughly -1..1) into 0..1.
fn sample(perlin: &Perlin, x: f64, y: f64) -> f64 {
    ((perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
}

fn land_value(perlin: &Perlin, nx: f64, ny: f64) -> f32 {
    let sum: f64 = LAND_OCTAVES
        .iter()
        .map(|&(freq, offset, weight)| sample(perlin, nx * freq + offset, ny * freq + offset) * weight)
        .sum();
    (sum / LAND_WEIGHT_SUM) as f32
}

fn resource_value(perlin: &Perlin, nx: f64, ny: f64) -> f32 {
    let richest = RESOURCE_LAYERS
        .iter()
        .map(|&(freq, offset, power, amplitude)| {
            sample(perlin, nx * freq + offset, ny * freq + offset).powf(power) * amplitude
        })
        .fold(0.0_f64, f64::max);
    (richest as f32).clamp(0.0, 1.0)
}

impl TerrainGrid {
    /// Generate a `cols` x `rows` grid. Deterministic for identical inputs.
    pub fn generate_with(params: &TerrainParams, cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let perlin = Perlin::new(params.seed);
        let threshold = params.ocean_threshold;

        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let nx = col as f64 * params.noise_scale;
                let ny = row as f64 * params.noise_scale;
                if land_value(&perlin, nx, ny) < threshold {
                    cells.push(TerrainCell::OCEAN);
                } else {
                    let rx = col as f64 * params.resource_noise_scale;
                    let ry = row as f64 * params.resource_noise_scale;
                    cells.push(TerrainCell {
                        is_land: true,
                        resource_density: resource_value(&perlin, rx, ry),
                    });
                }
            }
        }

        let mut grid = Self {
            cols,
            rows,
            cell_size: params.cell_size.max(f32::EPSILON),
            seed: params.seed,
            cells,
        };
        for _ in 0..params.smoothing_iterations {
            grid.smooth_once();
        }
        grid
    }

    /// Build a grid from explicit cells (row-major). Used by tests and scenarios.
    pub fn from_cells(cols: usize, rows: usize, cell_size: f32, cells: Vec<TerrainCell>) -> Option<Self> {
        if cols == 0 || rows == 0 || cells.len() != cols * rows {
            return None;
        }
        Some(Self {
            cols,
            rows,
            cell_size: cell_size.max(f32::EPSILON),
            seed: 0,
            cells,
        })
    }

    /// All-land grid with uniform density.
    pub fn uniform_land(cols: usize, rows: usize, cell_size: f32, density: f32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell_size: cell_size.max(f32::EPSILON),
            seed: 0,
            cells: vec![
                TerrainCell {
                    is_land: true,
                    resource_density: density.clamp(0.0, 1.0),
                };
                cols * rows
            ],
        }
    }

    /// One cellular-automaton pass, reading only the previous state.
    fn smooth_once(&mut self) {
        let previous = self.cells.clone();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let mut land = 0usize;
                let mut density_sum = 0.0f32;
                for (ncol, nrow) in self.wrapped_neighbors(col, row) {
                    let neighbor = previous[nrow * self.cols + ncol];
                    if neighbor.is_land {
                        land += 1;
                        density_sum += neighbor.resource_density;
                    }
                }
                let ocean = 8 - land;
                let idx = row * self.cols + col;
                if previous[idx].is_land {
                    if ocean > SMOOTHING_NEIGHBOR_LIMIT {
                        self.cells[idx] = TerrainCell::OCEAN;
                    }
                } else if land > SMOOTHING_NEIGHBOR_LIMIT {
                    self.cells[idx] = TerrainCell {
                        is_land: true,
                        resource_density: density_sum / land as f32,
                    };
                }
            }
        }
    }

    /// The 8 toroidal neighbors of (col, row).
    pub fn wrapped_neighbors(&self, col: usize, row: usize) -> [(usize, usize); 8] {
        let mut out = [(0, 0); 8];
        let mut i = 0;
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                out[i] = self.wrap(col as i64 + dc, row as i64 + dr);
                i += 1;
            }
        }
        out
    }

    /// Wrap signed grid coordinates into range.
    pub fn wrap(&self, col: i64, row: i64) -> (usize, usize) {
        (
            col.rem_euclid(self.cols as i64) as usize,
            row.rem_euclid(self.rows as i64) as usize,
        )
    }

    /// Grid indices for a continuous world position (floor, then wrap).
    pub fn cell_index(&self, x: f32, y: f32) -> (usize, usize) {
        let col = (x / self.cell_size).floor();
        let row = (y / self.cell_size).floor();
        let col = if col.is_finite() { col as i64 } else { 0 };
        let row = if row.is_finite() { row as i64 } else { 0 };
        self.wrap(col, row)
    }

    pub fn cell(&self, col: usize, row: usize) -> TerrainCell {
        let (col, row) = self.wrap(col as i64, row as i64);
        self.cells[row * self.cols + col]
    }

    /// Cell under a continuous position. O(1).
    pub fn terrain_at(&self, x: f32, y: f32) -> TerrainCell {
        let (col, row) = self.cell_index(x, y);
        self.cells[row * self.cols + col]
    }

    pub fn is_land_at(&self, x: f32, y: f32) -> bool {
        self.terrain_at(x, y).is_land
    }

    /// Resource density under a continuous position. O(1).
    pub fn resource_at(&self, x: f32, y: f32) -> f32 {
        self.terrain_at(x, y).resource_density
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            col as f32 * self.cell_size + self.cell_size / 2.0,
            row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Random land cell center, falling back to the world center after
    /// `LAND_SEARCH_ATTEMPTS` misses.
    pub fn find_land_position(&self, rng: &mut impl Rng) -> Vec2 {
        for _ in 0..LAND_SEARCH_ATTEMPTS {
            let col = rng.gen_range(0..self.cols);
            let row = rng.gen_range(0..self.rows);
            if self.cells[row * self.cols + col].is_land {
                return self.cell_center(col, row);
            }
        }
        Vec2::new(self.width() / 2.0, self.height() / 2.0)
    }

    pub fn land_fraction(&self) -> f32 {
        let land = self.cells.iter().filter(|c| c.is_land).count();
        land as f32 / self.cells.len() as f32
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    pub fn cells(&self) -> &[TerrainCell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(42, 10, 10, 0.45);
        let b = generate(42, 10, 10, 0.45);
        assert_eq!(a, b);
        assert_eq!(a.cells().len(), 100);
    }

    #[test]
    fn test_ocean_has_no_resources() {
        let grid = generate(7, 60, 40, 0.45);
        for cell in grid.cells() {
            assert!((0.0..=1.0).contains(&cell.resource_density));
            if !cell.is_land {
                assert_eq!(cell.resource_density, 0.0);
            }
        }
    }

    #[test]
    fn test_threshold_extremes() {
        // Every normalized value is >= 0, so a zero threshold means all land.
        let land = generate(3, 20, 20, 0.0);
        assert!(land.cells().iter().all(|c| c.is_land));

        // Nothing reaches above 1.0, so everything is ocean.
        let ocean = generate(3, 20, 20, 1.01);
        assert!(ocean.cells().iter().all(|c| !c.is_land));
    }

    #[test]
    fn test_toroidal_wrap() {
        let grid = generate(11, 30, 20, 0.45);
        let w = grid.cols() as f32 * grid.cell_size();
        let h = grid.rows() as f32 * grid.cell_size();
        for &(x, y) in &[(0.0, 0.0), (12.3, 44.4), (149.9, 99.9), (-3.0, -7.5)] {
            assert_eq!(grid.terrain_at(x, y), grid.terrain_at(x + w, y));
            assert_eq!(grid.terrain_at(x, y), grid.terrain_at(x, y + h));
            assert_eq!(grid.resource_at(x, y), grid.resource_at(x - w, y));
        }
    }

    #[test]
    fn test_cell_index_floor_and_wrap() {
        let grid = TerrainGrid::uniform_land(10, 5, 5.0, 0.5);
        assert_eq!(grid.cell_index(0.0, 0.0), (0, 0));
        assert_eq!(grid.cell_index(4.99, 4.99), (0, 0));
        assert_eq!(grid.cell_index(5.0, 0.0), (1, 0));
        assert_eq!(grid.cell_index(-0.1, -0.1), (9, 4));
        assert_eq!(grid.cell_index(50.0, 25.0), (0, 0));
    }

    #[test]
    fn test_smoothing_fills_lake() {
        // 5x5 land with a single ocean cell in the middle: all 8 neighbors
        // are land, so the hole is filled with their mean density.
        let mut cells = vec![
            TerrainCell {
                is_land: true,
                resource_density: 0.6,
            };
            25
        ];
        cells[12] = TerrainCell::OCEAN;
        let mut grid = TerrainGrid::from_cells(5, 5, 1.0, cells).unwrap();
        grid.smooth_once();
        let filled = grid.cell(2, 2);
        assert!(filled.is_land);
        assert!((filled.resource_density - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_fill_averages_land_neighbors_only() {
        // Six land neighbors flip the center; the two ocean neighbors must
        // not drag the mean down.
        let mut cells = vec![TerrainCell::OCEAN; 25];
        for (i, idx) in [6, 7, 8, 11, 13, 16].into_iter().enumerate() {
            cells[idx] = TerrainCell {
                is_land: true,
                resource_density: 0.1 * (i + 1) as f32,
            };
        }
        let mut grid = TerrainGrid::from_cells(5, 5, 1.0, cells).unwrap();
        grid.smooth_once();
        let filled = grid.cell(2, 2);
        assert!(filled.is_land);
        assert!((filled.resource_density - 0.35).abs() < 1e-5);

        // Five land neighbors are not enough.
        let mut cells = vec![TerrainCell::OCEAN; 25];
        for idx in [6, 7, 8, 11, 13] {
            cells[idx] = TerrainCell {
                is_land: true,
                resource_density: 0.9,
            };
        }
        let mut grid = TerrainGrid::from_cells(5, 5, 1.0, cells).unwrap();
        grid.smooth_once();
        assert_eq!(grid.cell(2, 2), TerrainCell::OCEAN);
    }

    #[test]
    fn test_smoothing_drowns_islet() {
        let mut cells = vec![TerrainCell::OCEAN; 25];
        cells[12] = TerrainCell {
            is_land: true,
            resource_density: 0.9,
        };
        let mut grid = TerrainGrid::from_cells(5, 5, 1.0, cells).unwrap();
        grid.smooth_once();
        assert_eq!(grid.cell(2, 2), TerrainCell::OCEAN);
    }

    #[test]
    fn test_neighbors_wrap_at_corner() {
        let grid = TerrainGrid::uniform_land(4, 3, 1.0, 0.0);
        let n = grid.wrapped_neighbors(0, 0);
        assert!(n.contains(&(3, 2)));
        assert!(n.contains(&(1, 1)));
        assert!(!n.contains(&(0, 0)));
    }

    #[test]
    fn test_find_land_position_fallback() {
        let grid = TerrainGrid::from_cells(4, 4, 10.0, vec![TerrainCell::OCEAN; 16]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(grid.find_land_position(&mut rng), Vec2::new(20.0, 20.0));

        let land = TerrainGrid::uniform_land(4, 4, 10.0, 0.5);
        let pos = land.find_land_position(&mut rng);
        assert!(land.is_land_at(pos.x, pos.y));
    }

    #[test]
    fn test_grid_size() {
        let params = TerrainParams::default();
        assert_eq!(params.grid_size(500.0, 500.0), (100, 100));
        assert_eq!(params.grid_size(1.0, 1.0), (1, 1));
    }
}
