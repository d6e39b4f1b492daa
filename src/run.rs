use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};

use eddy_fluids::{FieldSet, SemiLagrangian2D, SemiLagrangianParams};
use eddy_io::{Config, InitialCondition, VtkWriter, WriteError};

pub fn run(config: &Config) -> Result<(), WriteError> {
    let mut fields = FieldSet::new(
        config.nx,
        config.ny,
        config.dx,
        config.dy,
        config.density,
    );

    match config.initial_condition {
        InitialCondition::TaylorGreen { amplitude } => fields.init_taylor_green(amplitude),
        InitialCondition::Custom => {
            fields.set_solid_border();
            for object in &config.solid {
                object.apply_solid(&mut fields);
            }
            for object in &config.velocity_u {
                object.apply_velocity_u(&mut fields);
            }
            for object in &config.velocity_v {
                object.apply_velocity_v(&mut fields);
            }
            if !config.smoke.is_empty() {
                fields.enable_smoke();
                for object in &config.smoke {
                    object.apply_smoke(&mut fields);
                }
            }
        }
    }

    let params = SemiLagrangianParams {
        solver: config.solver.kind,
        max_iterations: config.solver.max_iterations,
        tolerance: config.solver.tolerance,
        ..Default::default()
    };

    let mut sim = SemiLagrangian2D::new(fields);
    let mut writer = VtkWriter::new(&config.folder, &config.filename, (config.dx, config.dy))?;

    write_sample(&mut writer, &sim, config, 0)?;

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template).unwrap()
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(config.nt as u64).with_style(style);

    for step in (1..=config.nt).progress_with(progress) {
        sim.step(config.dt, &params);

        if step % config.sampling_rate == 0 {
            write_sample(&mut writer, &sim, config, step)?;
        }
    }

    writer.finish()
}

fn write_sample(
    writer: &mut VtkWriter,
    sim: &SemiLagrangian2D,
    config: &Config,
    step: usize,
) -> Result<(), WriteError> {
    let time = step as f64 * config.dt as f64;
    let fields = &sim.fields;

    if config.write.u {
        writer.write_grid(&fields.u, "u", step, time)?;
    }
    if config.write.v {
        writer.write_grid(&fields.v, "v", step, time)?;
    }
    if config.write.pressure {
        writer.write_grid(&fields.pressure, "p", step, time)?;
    }
    if config.write.divergence {
        writer.write_grid(&fields.divergence, "div", step, time)?;
    }
    if config.write.norm_velocity {
        writer.write_grid(&fields.velocity_norm_grid(), "normVelocity", step, time)?;
    }
    if let Some(smoke) = &fields.smoke {
        writer.write_grid(smoke, "smoke", step, time)?;
    }

    Ok(())
}
