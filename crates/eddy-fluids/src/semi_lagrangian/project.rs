use crate::fields::FieldSet;

// Velocity projection: subtract the pressure gradient from interior faces so
// the field becomes divergence-free, and pin faces touching solid cells to
// the wall velocity. The wall velocity is threaded explicitly so moving
// boundaries stay possible later.

/// Pins every velocity face adjacent to a solid cell to `wall_velocity`.
///
/// Called before the divergence pass so the right-hand side of the Poisson
/// system already accounts for zero wall flux, and again implicitly by
/// `project_velocity` after the solve.
pub(crate) fn enforce_wall_velocity(fields: &mut FieldSet, wall_velocity: f32) {
    let (nx, ny) = (fields.nx, fields.ny);

    for j in 0..ny {
        for i in 0..=nx {
            if u_face_touches_solid(fields, i, j) {
                fields.u.set(i, j, wall_velocity);
            }
        }
    }

    for j in 0..=ny {
        for i in 0..nx {
            if v_face_touches_solid(fields, i, j) {
                fields.v.set(i, j, wall_velocity);
            }
        }
    }
}

/// Subtracts `(dt/(ρ·d))·∇p` from every face between two fluid cells.
///
/// Faces touching a solid cell take the wall velocity instead, enforcing the
/// no-flow-through condition exactly. The outermost faces carry no pressure
/// gradient and are left untouched unless their single adjacent cell is
/// solid.
pub(crate) fn project_velocity(fields: &mut FieldSet, dt: f32, wall_velocity: f32) {
    let coef_x = dt / (fields.density * fields.dx);
    let coef_y = dt / (fields.density * fields.dy);
    let (nx, ny) = (fields.nx, fields.ny);

    for j in 0..ny {
        for i in 0..=nx {
            if u_face_touches_solid(fields, i, j) {
                fields.u.set(i, j, wall_velocity);
            } else if i > 0 && i < nx {
                let grad = fields.pressure.get(i, j) - fields.pressure.get(i - 1, j);
                let u_new = fields.u.get(i, j) - coef_x * grad;
                fields.u.set(i, j, u_new);
            }
        }
    }

    for j in 0..=ny {
        for i in 0..nx {
            if v_face_touches_solid(fields, i, j) {
                fields.v.set(i, j, wall_velocity);
            } else if j > 0 && j < ny {
                let grad = fields.pressure.get(i, j) - fields.pressure.get(i, j - 1);
                let v_new = fields.v.get(i, j) - coef_y * grad;
                fields.v.set(i, j, v_new);
            }
        }
    }
}

#[inline]
fn u_face_touches_solid(fields: &FieldSet, i: usize, j: usize) -> bool {
    fields.solid_cell(i as i64 - 1, j as i64) || fields.solid_cell(i as i64, j as i64)
}

#[inline]
fn v_face_touches_solid(fields: &FieldSet, i: usize, j: usize) -> bool {
    fields.solid_cell(i as i64, j as i64 - 1) || fields.solid_cell(i as i64, j as i64)
}
