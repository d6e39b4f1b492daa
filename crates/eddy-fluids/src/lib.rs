pub mod fields;
pub mod grid;
pub mod scene;
pub mod semi_lagrangian;

pub use fields::{CellLabel, FieldSet};
pub use grid::{ScalarGrid, Stagger};
pub use scene::SceneObject;
pub use semi_lagrangian::{SemiLagrangian2D, SemiLagrangianParams, SolveStats, SolverKind};
