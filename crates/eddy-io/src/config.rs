use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use eddy_fluids::{SceneObject, SolverKind};

use crate::expr::{ExprError, IntExpr};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown solver type `{0}` (expected `jacobi` or `gauss_seidel`)")]
    UnknownSolverType(String),
    #[error("unknown initial condition `{0}` (expected `custom` or `taylor_green`)")]
    UnknownInitialCondition(String),
    #[error("unknown scene object type `{0}` (expected `rectangle` or `cylinder`)")]
    UnknownObjectType(String),
    #[error("scene entry for `{0}` must be an object or an array of objects")]
    MalformedSceneEntry(String),
    #[error("grid size {nx} x {ny} is invalid (need nx >= 1 and ny >= 1)")]
    InvalidGridSize { nx: i64, ny: i64 },
    #[error(transparent)]
    Expression(#[from] ExprError),
}

/// Solver selection and stopping criteria for the pressure relaxation.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub kind: SolverKind,
    pub max_iterations: usize,
    pub tolerance: f32,
}

#[derive(Debug, Clone, Copy)]
pub enum InitialCondition {
    /// Walls and initial data come from the scene objects.
    Custom,
    /// Analytic vortex array; the whole domain stays fluid.
    TaylorGreen { amplitude: f32 },
}

/// Which cell-centered fields get written at each sampled step.
#[derive(Debug, Clone, Copy)]
pub struct WriteFlags {
    pub u: bool,
    pub v: bool,
    pub pressure: bool,
    pub divergence: bool,
    pub norm_velocity: bool,
}

/// Fully resolved simulation configuration: all symbolic expressions
/// evaluated, all enumerations validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub nx: usize,
    pub ny: usize,
    pub nt: usize,
    pub dx: f32,
    pub dy: f32,
    pub dt: f32,
    pub density: f32,
    pub sampling_rate: usize,
    pub initial_condition: InitialCondition,
    pub solver: SolverConfig,
    pub write: WriteFlags,
    pub folder: String,
    pub filename: String,
    pub velocity_u: Vec<SceneObject>,
    pub velocity_v: Vec<SceneObject>,
    pub solid: Vec<SceneObject>,
    pub smoke: Vec<SceneObject>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;
        raw.resolve()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Simulation Parameters ===")?;
        writeln!(
            f,
            "  Grid    : {} x {}  dx={} dy={}",
            self.nx, self.ny, self.dx, self.dy
        )?;
        writeln!(f, "  Time    : nt={} dt={}", self.nt, self.dt)?;
        writeln!(f, "  Density : {}", self.density)?;
        writeln!(f, "  Sampling: {}", self.sampling_rate)?;
        match self.initial_condition {
            InitialCondition::Custom => writeln!(f, "  IC      : custom")?,
            InitialCondition::TaylorGreen { amplitude } => {
                writeln!(f, "  IC      : taylor_green  amplitude={amplitude}")?
            }
        }
        let kind = match self.solver.kind {
            SolverKind::Jacobi => "jacobi",
            SolverKind::GaussSeidel => "gauss_seidel",
        };
        writeln!(
            f,
            "  Solver  : {kind}  maxIter={}  tol={}",
            self.solver.max_iterations, self.solver.tolerance
        )?;
        writeln!(f, "  Output  : folder='{}'", self.folder)?;
        writeln!(
            f,
            "  Write   : u={} v={} p={} div={} norm={}",
            self.write.u,
            self.write.v,
            self.write.pressure,
            self.write.divergence,
            self.write.norm_velocity
        )?;
        writeln!(f, "  velocityU objects : {}", self.velocity_u.len())?;
        writeln!(f, "  velocityV objects : {}", self.velocity_v.len())?;
        writeln!(f, "  solid    objects  : {}", self.solid.len())?;
        writeln!(f, "  smoke    objects  : {}", self.smoke.len())?;
        write!(f, "=============================")
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    dx: f32,
    dy: f32,
    dt: f32,
    nx: i64,
    ny: i64,
    nt: usize,
    sampling_rate: usize,
    density: f32,
    write_u: bool,
    write_v: bool,
    write_p: bool,
    write_div: bool,
    write_norm_velocity: bool,
    folder: String,
    filename: String,
    initialcondition: RawInitialCondition,
    solver: RawSolver,
    velocityu: Option<Value>,
    velocityv: Option<Value>,
    solid: Option<Value>,
    smoke: Option<Value>,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            dx: 0.01,
            dy: 0.01,
            dt: 1e-12,
            nx: 100,
            ny: 100,
            nt: 100,
            sampling_rate: 1,
            density: 1000.0,
            write_u: true,
            write_v: true,
            write_p: true,
            write_div: false,
            write_norm_velocity: false,
            folder: "results".into(),
            filename: "simulation".into(),
            initialcondition: RawInitialCondition::default(),
            solver: RawSolver::default(),
            velocityu: None,
            velocityv: None,
            solid: None,
            smoke: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawInitialCondition {
    #[serde(rename = "type")]
    kind: String,
    amplitude: f32,
}

impl Default for RawInitialCondition {
    fn default() -> Self {
        RawInitialCondition {
            kind: "custom".into(),
            amplitude: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSolver {
    #[serde(rename = "type")]
    kind: String,
    max_iterations: usize,
    tolerance: f32,
}

impl Default for RawSolver {
    fn default() -> Self {
        RawSolver {
            kind: "gauss_seidel".into(),
            max_iterations: 1000,
            tolerance: 1e-2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRectangle {
    val: f32,
    x1: IntExpr,
    y1: IntExpr,
    x2: IntExpr,
    y2: IntExpr,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCylinder {
    val: f32,
    x: IntExpr,
    y: IntExpr,
    r: IntExpr,
}

impl RawConfig {
    fn resolve(self) -> Result<Config, ConfigError> {
        if self.nx < 1 || self.ny < 1 {
            return Err(ConfigError::InvalidGridSize {
                nx: self.nx,
                ny: self.ny,
            });
        }

        let vars: &[(&str, i64)] = &[("nx", self.nx), ("ny", self.ny)];

        let initial_condition = match self.initialcondition.kind.as_str() {
            "custom" => InitialCondition::Custom,
            "taylor_green" => InitialCondition::TaylorGreen {
                amplitude: self.initialcondition.amplitude,
            },
            other => return Err(ConfigError::UnknownInitialCondition(other.into())),
        };

        let kind = match self.solver.kind.as_str() {
            "jacobi" => SolverKind::Jacobi,
            "gauss_seidel" => SolverKind::GaussSeidel,
            other => return Err(ConfigError::UnknownSolverType(other.into())),
        };

        Ok(Config {
            nx: self.nx as usize,
            ny: self.ny as usize,
            nt: self.nt,
            dx: self.dx,
            dy: self.dy,
            dt: self.dt,
            density: self.density,
            // a rate of zero would sample nothing and divide by zero
            sampling_rate: self.sampling_rate.max(1),
            initial_condition,
            solver: SolverConfig {
                kind,
                max_iterations: self.solver.max_iterations,
                tolerance: self.solver.tolerance,
            },
            write: WriteFlags {
                u: self.write_u,
                v: self.write_v,
                pressure: self.write_p,
                divergence: self.write_div,
                norm_velocity: self.write_norm_velocity,
            },
            folder: self.folder,
            filename: self.filename,
            velocity_u: parse_scene(self.velocityu, vars)?,
            velocity_v: parse_scene(self.velocityv, vars)?,
            solid: parse_scene(self.solid, vars)?,
            smoke: parse_scene(self.smoke, vars)?,
        })
    }
}

/// Parses one scene block: a JSON object keyed by shape type, each value
/// either a single shape or an array of shapes.
fn parse_scene(
    node: Option<Value>,
    vars: &[(&str, i64)],
) -> Result<Vec<SceneObject>, ConfigError> {
    let Some(node) = node else {
        return Ok(Vec::new());
    };

    let Value::Object(entries) = node else {
        return Err(ConfigError::MalformedSceneEntry("scene".into()));
    };

    let mut objects = Vec::new();
    for (kind, value) in entries {
        match value {
            Value::Array(items) => {
                for item in items {
                    objects.push(parse_object(&kind, item, vars)?);
                }
            }
            item @ Value::Object(_) => objects.push(parse_object(&kind, item, vars)?),
            _ => return Err(ConfigError::MalformedSceneEntry(kind)),
        }
    }

    Ok(objects)
}

fn parse_object(
    kind: &str,
    value: Value,
    vars: &[(&str, i64)],
) -> Result<SceneObject, ConfigError> {
    match kind {
        "rectangle" => {
            let raw: RawRectangle = serde_json::from_value(value)?;
            Ok(SceneObject::Rectangle {
                val: raw.val,
                x1: raw.x1.resolve(vars)?,
                y1: raw.y1.resolve(vars)?,
                x2: raw.x2.resolve(vars)?,
                y2: raw.y2.resolve(vars)?,
            })
        }
        "cylinder" => {
            let raw: RawCylinder = serde_json::from_value(value)?;
            Ok(SceneObject::Cylinder {
                val: raw.val,
                cx: raw.x.resolve(vars)?,
                cy: raw.y.resolve(vars)?,
                r: raw.r.resolve(vars)?,
            })
        }
        other => Err(ConfigError::UnknownObjectType(other.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_the_defaults() {
        let cfg = Config::from_json("{}").unwrap();

        assert_eq!(cfg.nx, 100);
        assert_eq!(cfg.ny, 100);
        assert_eq!(cfg.nt, 100);
        assert_eq!(cfg.dx, 0.01);
        assert_eq!(cfg.dt, 1e-12);
        assert_eq!(cfg.density, 1000.0);
        assert_eq!(cfg.sampling_rate, 1);
        assert!(matches!(cfg.initial_condition, InitialCondition::Custom));
        assert!(matches!(cfg.solver.kind, SolverKind::GaussSeidel));
        assert_eq!(cfg.solver.max_iterations, 1000);
        assert!(cfg.write.u && cfg.write.v && cfg.write.pressure);
        assert!(!cfg.write.divergence && !cfg.write.norm_velocity);
        assert_eq!(cfg.folder, "results");
        assert_eq!(cfg.filename, "simulation");
        assert!(cfg.solid.is_empty());
    }

    #[test]
    fn full_document_parses() {
        let cfg = Config::from_json(
            r#"{
                "nx": 64, "ny": 32, "nt": 10, "dt": 0.001,
                "sampling_rate": 2,
                "write_norm_velocity": true,
                "initialcondition": { "type": "taylor_green", "amplitude": 2.5 },
                "solver": { "type": "jacobi", "max_iterations": 200, "tolerance": 1e-4 },
                "solid": {
                    "rectangle": { "x1": 0, "y1": 0, "x2": "nx-1", "y2": 0 },
                    "cylinder": [ { "x": "nx/2", "y": "ny/2", "r": 4 } ]
                },
                "velocityu": { "rectangle": { "val": 1.5, "x1": 1, "y1": 1, "x2": 3, "y2": 3 } }
            }"#,
        )
        .unwrap();

        assert_eq!((cfg.nx, cfg.ny, cfg.nt), (64, 32, 10));
        assert_eq!(cfg.sampling_rate, 2);
        assert!(cfg.write.norm_velocity);
        assert!(matches!(
            cfg.initial_condition,
            InitialCondition::TaylorGreen { amplitude } if amplitude == 2.5
        ));
        assert!(matches!(cfg.solver.kind, SolverKind::Jacobi));
        assert_eq!(cfg.solver.max_iterations, 200);

        assert_eq!(cfg.solid.len(), 2);
        assert!(cfg.solid.iter().any(|o| matches!(
            o,
            SceneObject::Cylinder { cx: 32, cy: 16, r: 4, .. }
        )));
        assert!(cfg.solid.iter().any(|o| matches!(
            o,
            SceneObject::Rectangle { x2: 63, .. }
        )));

        assert_eq!(cfg.velocity_u.len(), 1);
        assert!(matches!(
            cfg.velocity_u[0],
            SceneObject::Rectangle { val, .. } if val == 1.5
        ));
    }

    #[test]
    fn unknown_solver_type_is_fatal() {
        let err = Config::from_json(r#"{ "solver": { "type": "multigrid" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSolverType(t) if t == "multigrid"));
    }

    #[test]
    fn unknown_initial_condition_is_fatal() {
        let err =
            Config::from_json(r#"{ "initialcondition": { "type": "vortex" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInitialCondition(_)));
    }

    #[test]
    fn unknown_object_type_is_fatal() {
        let err = Config::from_json(r#"{ "solid": { "triangle": {} } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownObjectType(t) if t == "triangle"));
    }

    #[test]
    fn scene_entry_must_be_object_or_array() {
        let err = Config::from_json(r#"{ "solid": { "rectangle": 3 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedSceneEntry(_)));
    }

    #[test]
    fn non_positive_grid_sizes_are_fatal() {
        let err = Config::from_json(r#"{ "nx": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGridSize { nx: 0, ny: 100 }));

        let err = Config::from_json(r#"{ "ny": -4 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGridSize { ny: -4, .. }));
    }

    #[test]
    fn sampling_rate_zero_is_clamped_to_one() {
        let cfg = Config::from_json(r#"{ "sampling_rate": 0 }"#).unwrap();
        assert_eq!(cfg.sampling_rate, 1);
    }
}
