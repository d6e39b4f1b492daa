use crate::fields::FieldSet;

mod advect;
mod pressure;
mod project;

pub use pressure::{solve as solve_pressure, SolveStats, SolverKind};

/// Parameters for one projection-method step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemiLagrangianParams {
    /// Relaxation scheme for the pressure solve.
    pub solver: SolverKind,
    /// Sweep ceiling for the pressure solve.
    pub max_iterations: usize,
    /// Convergence tolerance on the maximum pressure change per sweep.
    pub tolerance: f32,
    /// Velocity imposed on faces adjacent to solid cells.
    pub wall_velocity: f32,
}

impl Default for SemiLagrangianParams {
    fn default() -> Self {
        Self {
            solver: SolverKind::GaussSeidel,
            max_iterations: 1000,
            tolerance: 1e-2,
            wall_velocity: 0.0,
        }
    }
}

/// Semi-Lagrangian projection-method integrator bound to one field set.
///
/// Each step runs the fixed stage sequence: advect velocity, advect the
/// passive scalar when present, enforce wall velocities, compute divergence,
/// solve for pressure, project. Stages never overlap and a step always
/// completes once entered.
#[derive(Debug, Clone)]
pub struct SemiLagrangian2D {
    pub fields: FieldSet,
}

impl SemiLagrangian2D {
    pub fn new(fields: FieldSet) -> Self {
        SemiLagrangian2D { fields }
    }

    /// Advances the simulation by `dt` and reports the pressure-solve stats
    /// for the step.
    pub fn step(&mut self, dt: f32, params: &SemiLagrangianParams) -> SolveStats {
        advect::advect_velocity(&mut self.fields, dt);
        advect::advect_scalar(&mut self.fields, dt);

        project::enforce_wall_velocity(&mut self.fields, params.wall_velocity);
        self.fields.compute_divergence();

        let stats = pressure::solve(
            &mut self.fields,
            dt,
            params.solver,
            params.max_iterations,
            params.tolerance,
        );

        project::project_velocity(&mut self.fields, dt, params.wall_velocity);

        stats
    }
}
