use crate::fields::{CellLabel, FieldSet};

/// Pointwise relaxation scheme for the pressure Poisson system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    /// Double-buffered sweeps; every update reads the previous full iterate.
    Jacobi,
    /// In-place sweeps in fixed j-outer/i-inner order; later cells see
    /// already-updated neighbors.
    GaussSeidel,
}

/// Outcome of one pressure solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveStats {
    /// Number of relaxation sweeps performed.
    pub iterations: usize,
    /// Maximum absolute pressure change over the final sweep.
    pub residual: f32,
}

/// Relaxes the discrete Poisson system implied by fluid/solid adjacency
/// until the maximum pressure change in a sweep drops below `tolerance` or
/// `max_iterations` sweeps have run. Running out of iterations is not an
/// error; the last iterate is kept and reported through the stats.
pub fn solve(
    fields: &mut FieldSet,
    dt: f32,
    kind: SolverKind,
    max_iterations: usize,
    tolerance: f32,
) -> SolveStats {
    match kind {
        SolverKind::Jacobi => solve_jacobi(fields, dt, max_iterations, tolerance),
        SolverKind::GaussSeidel => solve_gauss_seidel(fields, dt, max_iterations, tolerance),
    }
}

const NEIGHBORS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// One-cell relaxation: `p = (rhs + sumN) / count` where `count` counts
/// in-bounds non-solid axis neighbors and `sumN` sums pressure at fluid
/// neighbors. Returns `None` for cells with no valid neighbor at all (fully
/// enclosed); those are skipped and keep their previous value.
fn relaxed_value(fields: &FieldSet, i: usize, j: usize, scale: f32) -> Option<f32> {
    let (ci, cj) = (i as i64, j as i64);

    let mut count = 0;
    let mut sum_n = 0.0;

    for (di, dj) in NEIGHBORS {
        let (ni, nj) = (ci + di, cj + dj);

        if !fields.open_cell(ni, nj) {
            continue;
        }

        count += 1;

        if fields.fluid_cell(ni, nj) {
            sum_n += fields.pressure.get(ni as usize, nj as usize);
        }
    }

    if count == 0 {
        return None;
    }

    let rhs = -scale * fields.divergence.get(i, j);
    Some((rhs + sum_n) / count as f32)
}

fn solve_jacobi(
    fields: &mut FieldSet,
    dt: f32,
    max_iterations: usize,
    tolerance: f32,
) -> SolveStats {
    let scale = fields.density * fields.dx * fields.dx / dt;
    let mut p_new = fields.pressure.clone();

    let mut iterations = 0;
    let mut residual = 0.0;

    for _ in 0..max_iterations {
        iterations += 1;
        let mut max_diff = 0.0f32;

        for j in 0..fields.ny {
            for i in 0..fields.nx {
                if fields.label(i, j) != CellLabel::Fluid {
                    continue;
                }

                let Some(val) = relaxed_value(fields, i, j, scale) else {
                    continue;
                };

                max_diff = max_diff.max((val - fields.pressure.get(i, j)).abs());
                p_new.set(i, j, val);
            }
        }

        // copy back for fluid cells only; solid cells are never written
        for j in 0..fields.ny {
            for i in 0..fields.nx {
                if fields.label(i, j) == CellLabel::Fluid {
                    fields.pressure.set(i, j, p_new.get(i, j));
                }
            }
        }

        residual = max_diff;

        if max_diff < tolerance {
            break;
        }
    }

    SolveStats { iterations, residual }
}

fn solve_gauss_seidel(
    fields: &mut FieldSet,
    dt: f32,
    max_iterations: usize,
    tolerance: f32,
) -> SolveStats {
    let scale = fields.density * fields.dx * fields.dx / dt;

    let mut iterations = 0;
    let mut residual = 0.0;

    for _ in 0..max_iterations {
        iterations += 1;
        let mut max_diff = 0.0f32;

        for j in 0..fields.ny {
            for i in 0..fields.nx {
                if fields.label(i, j) != CellLabel::Fluid {
                    continue;
                }

                let Some(val) = relaxed_value(fields, i, j, scale) else {
                    continue;
                };

                max_diff = max_diff.max((val - fields.pressure.get(i, j)).abs());
                fields.pressure.set(i, j, val);
            }
        }

        residual = max_diff;

        if max_diff < tolerance {
            break;
        }
    }

    SolveStats { iterations, residual }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_divergence_converges_immediately() {
        // 4×4 box: solid ring around a 2×2 fluid interior, everything at rest
        let mut fields = FieldSet::new(4, 4, 1.0, 1.0, 1.0);
        fields.set_solid_border();
        fields.compute_divergence();

        let stats = solve(&mut fields, 0.1, SolverKind::Jacobi, 50, 1e-3);

        assert!(stats.iterations < 50);
        assert!(stats.residual < 1e-3);
        assert!(fields.pressure.values().iter().all(|&p| p.abs() < 1e-6));
    }

    #[test]
    fn pressure_is_antisymmetric_about_a_centered_impulse() {
        // single nonzero u face in the middle of a symmetric domain
        let mut fields = FieldSet::new(6, 5, 1.0, 1.0, 1.0);
        fields.set_solid_border();
        fields.u.set(3, 2, 1.0);
        fields.compute_divergence();

        solve(&mut fields, 0.1, SolverKind::Jacobi, 500, 1e-7);

        // mirror about the face between cells i=2 and i=3
        for j in 1..4 {
            for k in 0..2 {
                let left = fields.pressure.get(2 - k, j);
                let right = fields.pressure.get(3 + k, j);
                assert!((left + right).abs() < 1e-5);
            }
        }

        // and symmetric about the face's row
        for i in 1..5 {
            let below = fields.pressure.get(i, 1);
            let above = fields.pressure.get(i, 3);
            assert!((below - above).abs() < 1e-5);
        }
    }

    #[test]
    fn gauss_seidel_matches_jacobi_at_convergence() {
        let mut jac = FieldSet::new(8, 8, 0.5, 0.5, 2.0);
        jac.set_solid_border();
        // only faces strictly between fluid cells carry flow, so the net
        // divergence over the fluid region is zero and the all-Neumann
        // system stays compatible
        for j in 1..7 {
            for i in 2..7 {
                jac.u.set(i, j, ((i * 3 + j) % 5) as f32 - 2.0);
            }
        }
        jac.compute_divergence();
        let mut gs = jac.clone();

        let jac_stats = solve(&mut jac, 0.05, SolverKind::Jacobi, 20_000, 1e-4);
        let gs_stats = solve(&mut gs, 0.05, SolverKind::GaussSeidel, 20_000, 1e-4);

        assert!(jac_stats.residual < 1e-4);
        assert!(gs_stats.residual < 1e-4);
        // Gauss-Seidel converges in fewer sweeps
        assert!(gs_stats.iterations < jac_stats.iterations);

        // the all-Neumann system fixes pressure only up to a constant, so
        // compare after pinning both fields at a reference fluid cell
        let jac_ref = jac.pressure.get(1, 1);
        let gs_ref = gs.pressure.get(1, 1);
        for j in 1..7 {
            for i in 1..7 {
                let a = jac.pressure.get(i, j) - jac_ref;
                let b = gs.pressure.get(i, j) - gs_ref;
                assert!((a - b).abs() < 1e-1);
            }
        }
    }

    #[test]
    fn solid_cells_are_never_written() {
        let mut fields = FieldSet::new(5, 5, 1.0, 1.0, 1.0);
        fields.set_solid_border();
        fields.pressure.set(0, 0, 7.0);
        for j in 0..5 {
            for i in 1..5 {
                fields.u.set(i, j, 1.0);
            }
        }
        fields.compute_divergence();

        solve(&mut fields, 0.1, SolverKind::GaussSeidel, 100, 1e-6);

        assert_eq!(fields.pressure.get(0, 0), 7.0);
    }

    #[test]
    fn iteration_cap_is_honored() {
        let mut fields = FieldSet::new(16, 16, 1.0, 1.0, 1.0);
        fields.set_solid_border();
        for j in 1..15 {
            for i in 1..16 {
                fields.u.set(i, j, (i as f32 * 0.7 + j as f32 * 1.3).sin());
            }
        }
        fields.compute_divergence();

        let stats = solve(&mut fields, 0.1, SolverKind::Jacobi, 3, 1e-12);

        assert_eq!(stats.iterations, 3);
        assert!(stats.residual > 1e-12);
    }
}
