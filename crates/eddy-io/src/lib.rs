pub mod config;
pub mod expr;
pub mod vtk;

pub use config::{Config, ConfigError, InitialCondition, SolverConfig, WriteFlags};
pub use expr::{ExprError, IntExpr};
pub use vtk::{VtkWriter, WriteError};
