use crate::fields::{CellLabel, FieldSet};
use crate::grid::ScalarGrid;

/// Declarative scene shape, resolved to cell indices by the configuration
/// layer.
///
/// The shape set is fixed and enumerable, so this is a closed enum rather
/// than trait objects. Coordinates are inclusive cell indices; out-of-range
/// parts of a shape are clamped to the target grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneObject {
    Rectangle {
        val: f32,
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
    },
    Cylinder {
        val: f32,
        cx: i64,
        cy: i64,
        r: i64,
    },
}

impl SceneObject {
    /// Labels the covered pressure cells solid.
    pub fn apply_solid(&self, fields: &mut FieldSet) {
        match *self {
            SceneObject::Rectangle { x1, y1, x2, y2, .. } => {
                let i_max = x2.min(fields.nx as i64 - 1);
                let j_max = y2.min(fields.ny as i64 - 1);

                for j in y1.max(0)..=j_max {
                    for i in x1.max(0)..=i_max {
                        fields.set_label(i as usize, j as usize, CellLabel::Solid);
                    }
                }
            }
            SceneObject::Cylinder { cx, cy, r, .. } => {
                fields.set_solid_disk(cx, cy, r);
            }
        }
    }

    /// Writes the shape's value into the covered u faces. Cylinders carry no
    /// velocity application.
    pub fn apply_velocity_u(&self, fields: &mut FieldSet) {
        if let SceneObject::Rectangle { val, x1, y1, x2, y2 } = *self {
            fill_rect(&mut fields.u, val, x1, y1, x2, y2);
        }
    }

    /// Writes the shape's value into the covered v faces.
    pub fn apply_velocity_v(&self, fields: &mut FieldSet) {
        if let SceneObject::Rectangle { val, x1, y1, x2, y2 } = *self {
            fill_rect(&mut fields.v, val, x1, y1, x2, y2);
        }
    }

    /// Writes the shape's value into the passive scalar, if it is enabled.
    pub fn apply_smoke(&self, fields: &mut FieldSet) {
        if let SceneObject::Rectangle { val, x1, y1, x2, y2 } = *self {
            if let Some(smoke) = fields.smoke.as_mut() {
                fill_rect(smoke, val, x1, y1, x2, y2);
            }
        }
    }
}

fn fill_rect(grid: &mut ScalarGrid, val: f32, x1: i64, y1: i64, x2: i64, y2: i64) {
    let i_max = x2.min(grid.nx() as i64 - 1);
    let j_max = y2.min(grid.ny() as i64 - 1);

    for j in y1.max(0)..=j_max {
        for i in x1.max(0)..=i_max {
            grid.set(i as usize, j as usize, val);
        }
    }
}
