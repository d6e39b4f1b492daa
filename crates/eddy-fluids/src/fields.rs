use std::f32::consts::TAU;

use glam::Vec2;
use ndarray::Array2;

use crate::grid::{ScalarGrid, Stagger};

/// Per-cell classification controlling which cells take part in the pressure
/// solve and how adjacent velocity faces are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLabel {
    Fluid,
    Solid,
}

/// Staggered (MAC) field set over a logical domain of `nx × ny` pressure
/// cells.
///
/// Velocity components live on cell faces: `u` has `(nx+1, ny)` samples at
/// `(i·dx, (j+0.5)·dy)` and `v` has `(nx, ny+1)` samples at
/// `((i+0.5)·dx, j·dy)`. Pressure, divergence and the optional passive
/// scalar are cell-centered. All grids are allocated once and overwritten in
/// place; labels are set during initialization and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FieldSet {
    /// Number of pressure cells in the X direction.
    pub nx: usize,
    /// Number of pressure cells in the Y direction.
    pub ny: usize,
    /// Cell size in the X direction, in meters.
    pub dx: f32,
    /// Cell size in the Y direction, in meters.
    pub dy: f32,
    /// The density of the fluid, in kg/m³.
    pub density: f32,

    /// Velocities on vertical faces.
    pub u: ScalarGrid,
    /// Velocities on horizontal faces.
    pub v: ScalarGrid,
    /// Cell-centered pressure.
    pub pressure: ScalarGrid,
    /// Cell-centered velocity divergence.
    pub divergence: ScalarGrid,
    /// Optional cell-centered passive scalar.
    pub smoke: Option<ScalarGrid>,

    labels: Array2<CellLabel>,
}

impl FieldSet {
    pub fn new(nx: usize, ny: usize, dx: f32, dy: f32, density: f32) -> Self {
        FieldSet {
            nx,
            ny,
            dx,
            dy,
            density,
            u: ScalarGrid::new(nx + 1, ny),
            v: ScalarGrid::new(nx, ny + 1),
            pressure: ScalarGrid::new(nx, ny),
            divergence: ScalarGrid::new(nx, ny),
            smoke: None,
            labels: Array2::from_elem((nx, ny), CellLabel::Fluid),
        }
    }

    #[inline]
    pub fn label(&self, i: usize, j: usize) -> CellLabel {
        self.labels[(i, j)]
    }

    #[inline]
    pub fn set_label(&mut self, i: usize, j: usize, label: CellLabel) {
        self.labels[(i, j)] = label;
    }

    #[inline]
    fn in_bounds(&self, i: i64, j: i64) -> bool {
        i >= 0 && j >= 0 && (i as usize) < self.nx && (j as usize) < self.ny
    }

    /// True for in-bounds solid cells; indices outside the domain are not
    /// solid.
    #[inline]
    pub fn solid_cell(&self, i: i64, j: i64) -> bool {
        self.in_bounds(i, j) && self.labels[(i as usize, j as usize)] == CellLabel::Solid
    }

    /// A cell participates in the Poisson stencil if it lies inside the
    /// domain and is not solid.
    #[inline]
    pub fn open_cell(&self, i: i64, j: i64) -> bool {
        self.in_bounds(i, j) && self.labels[(i as usize, j as usize)] != CellLabel::Solid
    }

    #[inline]
    pub fn fluid_cell(&self, i: i64, j: i64) -> bool {
        self.in_bounds(i, j) && self.labels[(i as usize, j as usize)] == CellLabel::Fluid
    }

    /// Physical extent of the domain.
    #[inline]
    pub fn domain_size(&self) -> Vec2 {
        Vec2::new(self.nx as f32 * self.dx, self.ny as f32 * self.dy)
    }

    /// Bilinear velocity sample at an arbitrary physical position.
    #[inline]
    pub fn sample_velocity(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.u.interpolate(p.x, p.y, self.dx, self.dy, Stagger::U),
            self.v.interpolate(p.x, p.y, self.dx, self.dy, Stagger::V),
        )
    }

    /// Creates the passive scalar grid if it does not exist yet.
    pub fn enable_smoke(&mut self) -> &mut ScalarGrid {
        let (nx, ny) = (self.nx, self.ny);
        self.smoke.get_or_insert_with(|| ScalarGrid::new(nx, ny))
    }

    /// Finite-difference divergence of the face velocities, for every
    /// pressure cell.
    pub fn compute_divergence(&mut self) {
        for j in 0..self.ny {
            for i in 0..self.nx {
                let dudx = (self.u.get(i + 1, j) - self.u.get(i, j)) / self.dx;
                let dvdy = (self.v.get(i, j + 1) - self.v.get(i, j)) / self.dy;
                self.divergence.set(i, j, dudx + dvdy);
            }
        }
    }

    /// Marks the outermost ring of pressure cells solid: a closed box.
    pub fn set_solid_border(&mut self) {
        for i in 0..self.nx {
            self.labels[(i, 0)] = CellLabel::Solid;
            self.labels[(i, self.ny - 1)] = CellLabel::Solid;
        }

        for j in 0..self.ny {
            self.labels[(0, j)] = CellLabel::Solid;
            self.labels[(self.nx - 1, j)] = CellLabel::Solid;
        }
    }

    /// Marks every cell within `r` cells of `(cx, cy)` solid (inclusive
    /// squared-distance test).
    pub fn set_solid_disk(&mut self, cx: i64, cy: i64, r: i64) {
        for j in 0..self.ny {
            for i in 0..self.nx {
                let di = i as i64 - cx;
                let dj = j as i64 - cy;

                if di * di + dj * dj <= r * r {
                    self.labels[(i, j)] = CellLabel::Solid;
                }
            }
        }
    }

    /// Velocity magnitude interpolated to cell centers.
    pub fn velocity_norm_grid(&self) -> ScalarGrid {
        let mut norm = ScalarGrid::new(self.nx, self.ny);

        for j in 0..self.ny {
            for i in 0..self.nx {
                let x = (i as f32 + 0.5) * self.dx;
                let y = (j as f32 + 0.5) * self.dy;

                let uc = self.u.interpolate(x, y, self.dx, self.dy, Stagger::U);
                let vc = self.v.interpolate(x, y, self.dx, self.dy, Stagger::V);

                norm.set(i, j, (uc * uc + vc * vc).sqrt());
            }
        }

        norm
    }

    /// Analytic Taylor-Green vortex at the staggered sample points. Leaves
    /// all cells fluid; the vortex runs wall-free.
    pub fn init_taylor_green(&mut self, amplitude: f32) {
        let lx = self.nx as f32 * self.dx;
        let ly = self.ny as f32 * self.dy;

        for j in 0..self.u.ny() {
            for i in 0..self.u.nx() {
                let x = i as f32 * self.dx;
                let y = (j as f32 + 0.5) * self.dy;

                let val = amplitude * (TAU * x / lx).sin() * (TAU * y / ly).cos();
                self.u.set(i, j, val);
            }
        }

        for j in 0..self.v.ny() {
            for i in 0..self.v.nx() {
                let x = (i as f32 + 0.5) * self.dx;
                let y = j as f32 * self.dy;

                let val = -amplitude * (TAU * x / lx).cos() * (TAU * y / ly).sin();
                self.v.set(i, j, val);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divergence_matches_finite_differences() {
        let mut fields = FieldSet::new(3, 3, 0.5, 0.25, 1.0);
        fields.u.set(1, 1, 2.0);
        fields.u.set(2, 1, 5.0);
        fields.v.set(1, 1, 1.0);
        fields.v.set(1, 2, -1.0);

        fields.compute_divergence();

        let expected = (5.0 - 2.0) / 0.5 + (-1.0 - 1.0) / 0.25;
        assert!((fields.divergence.get(1, 1) - expected).abs() < 1e-5);
        assert_eq!(fields.divergence.get(0, 0), 0.0);
    }

    #[test]
    fn solid_border_is_a_closed_ring() {
        let mut fields = FieldSet::new(5, 4, 1.0, 1.0, 1.0);
        fields.set_solid_border();

        for j in 0..4 {
            for i in 0..5 {
                let on_ring = i == 0 || i == 4 || j == 0 || j == 3;
                let expected = if on_ring { CellLabel::Solid } else { CellLabel::Fluid };
                assert_eq!(fields.label(i, j), expected);
            }
        }
    }

    #[test]
    fn solid_disk_is_inclusive() {
        let mut fields = FieldSet::new(7, 7, 1.0, 1.0, 1.0);
        fields.set_solid_disk(3, 3, 2);

        // exactly on the radius
        assert_eq!(fields.label(3, 1), CellLabel::Solid);
        assert_eq!(fields.label(5, 3), CellLabel::Solid);
        assert_eq!(fields.label(3, 3), CellLabel::Solid);
        // sqrt(8) > 2
        assert_eq!(fields.label(5, 5), CellLabel::Fluid);
        assert_eq!(fields.label(0, 0), CellLabel::Fluid);
    }

    #[test]
    fn velocity_norm_of_uniform_flow() {
        let mut fields = FieldSet::new(6, 6, 0.1, 0.1, 1.0);
        fields.u.fill(3.0);
        fields.v.fill(4.0);

        let norm = fields.velocity_norm_grid();

        // interior centers see the full stencil on both components
        for j in 1..5 {
            for i in 1..5 {
                assert!((norm.get(i, j) - 5.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn taylor_green_faces_are_zero_at_period_boundaries() {
        let mut fields = FieldSet::new(8, 8, 0.125, 0.125, 1.0);
        fields.init_taylor_green(2.0);

        // sin(0) = sin(2π) = 0 on the leftmost and rightmost u faces
        for j in 0..8 {
            assert!(fields.u.get(0, j).abs() < 1e-4);
            assert!(fields.u.get(8, j).abs() < 1e-4);
        }

        // v changes sign between the lower and upper half of the domain
        let lower = fields.v.get(2, 2);
        let upper = fields.v.get(2, 6);
        assert!(lower != 0.0);
        assert!((lower + upper).abs() < 1e-3);
    }

    #[test]
    fn neighbor_queries_exclude_out_of_domain_cells() {
        let fields = FieldSet::new(2, 2, 1.0, 1.0, 1.0);

        assert!(!fields.solid_cell(-1, 0));
        assert!(!fields.open_cell(-1, 0));
        assert!(!fields.fluid_cell(2, 0));
        assert!(fields.open_cell(1, 1));
    }
}
