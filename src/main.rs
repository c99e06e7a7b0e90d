//! Asteroid Field headless runner
//!
//! Drives the simulation with a simple autopilot at a fixed frame rate and
//! logs what happens. Usage: `asteroid-field [tuning.json] [seconds]`.
//! Set `RUST_LOG=debug` to watch individual spawns and splits.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Asteroid Field (headless) starting...");

    if let Err(err) = native::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; the host embeds `asteroid_field::sim` directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::f32::consts::{PI, TAU};
    use std::time::{SystemTime, UNIX_EPOCH};

    use asteroid_field::services::LogServices;
    use asteroid_field::sim::{
        ArenaBounds, ContextBuilder, FixedStepDriver, GamePhase, SimulationContext, TickInput,
    };
    use asteroid_field::{ConfigError, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const DEFAULT_SECONDS: f32 = 60.0;
    const FIRE_EVERY_FRAMES: u64 = 8;
    const REPORT_EVERY_FRAMES: u64 = 300;
    /// Vertical half-extent of the camera, in world units
    const CAMERA_ORTHO_SIZE: f32 = 9.0;
    const CAMERA_ASPECT: f32 = 16.0 / 9.0;

    pub fn run() -> Result<(), ConfigError> {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next() {
            Some(path) => Tuning::load(&path)?,
            None => Tuning::default(),
        };
        let seconds = match args.next() {
            Some(raw) => raw.parse::<f32>().unwrap_or_else(|_| {
                log::warn!("Ignoring unparsable duration {raw:?}");
                DEFAULT_SECONDS
            }),
            None => DEFAULT_SECONDS,
        };
        if seconds <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "run seconds",
                value: seconds,
            });
        }

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        let mut ctx = ContextBuilder::new()
            .tuning(tuning)
            .arena(ArenaBounds::from_camera(CAMERA_ORTHO_SIZE, CAMERA_ASPECT))
            .seed(seed)
            .effects(LogServices)
            .score(LogServices)
            .build()?;
        let mut driver = FixedStepDriver::new(true);

        let frames = (seconds / FRAME_DT).ceil() as u64;
        let mut best = 0;
        for frame in 0..frames {
            driver.sample_input(autopilot(&ctx, frame));
            driver.advance(&mut ctx, FRAME_DT);
            best = best.max(ctx.score);

            if frame % REPORT_EVERY_FRAMES == 0 {
                log::info!(
                    "t={:>5.1}s phase={:?} asteroids={} bullets={} effects={} score={}",
                    ctx.time_ticks as f32 * asteroid_field::consts::SIM_DT,
                    ctx.phase,
                    ctx.asteroids.live_count(),
                    ctx.bullets.live_count(),
                    ctx.effects.live_count(),
                    ctx.score
                );
            }
        }

        log::info!(
            "Finished after {} ticks: score {}, best {}",
            ctx.time_ticks,
            ctx.score,
            best
        );
        Ok(())
    }

    /// Turn toward the nearest asteroid and keep shooting
    fn autopilot(ctx: &SimulationContext, frame: u64) -> TickInput {
        if ctx.phase != GamePhase::Playing {
            return TickInput::default();
        }

        let nearest = ctx
            .asteroids
            .iter()
            .map(|(_, a)| a.pos - ctx.ship.pos)
            .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()));

        let Some(offset) = nearest else {
            return TickInput::default();
        };

        // Rotation 0 faces +Y, counter-clockwise positive
        let target = (-offset.x).atan2(offset.y);
        let error = (target - ctx.ship.rotation + PI).rem_euclid(TAU) - PI;

        TickInput {
            turn: (error * 2.0).clamp(-1.0, 1.0),
            thrust: 0.0,
            fire: frame % FIRE_EVERY_FRAMES == 0 && error.abs() < 0.2,
            restart: false,
        }
    }
}
