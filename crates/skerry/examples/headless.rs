//! Headless — run the game core without a window.
//!
//! Plays a minute of simulated time at 60 Hz with a scripted "player" that
//! changes direction every second, and logs level events as they happen.
//!
//! Run with: `RUST_LOG=info cargo run -p skerry --example headless -- [seed]`

use skerry::prelude::*;

const TICKS_PER_SECOND: u32 = 60;
const SECONDS: u32 = 60;

/// Logs level events the way a HUD would display them.
struct Hud;

impl MessageHandler for Hud {
    fn on_message(&mut self, message: &Message) {
        match &message.context {
            Some(Payload::Level(report)) => log::info!(
                "[HUD] {} | level {} | {}/{} points | {} lives | {}x{}",
                message.code,
                report.level_id,
                report.collected,
                report.points_to_collect,
                report.lives,
                report.difficulty.width,
                report.difficulty.depth,
            ),
            _ => log::info!("[HUD] {}", message.code),
        }
    }
}

/// Counts draw calls instead of drawing.
#[derive(Default)]
struct CountingRenderer {
    cubes: usize,
}

impl Renderer for CountingRenderer {
    fn draw_cube(&mut self, _cube: &CubeDraw<'_>) {
        self.cubes += 1;
    }
}

fn main() -> Result<(), EngineError> {
    env_logger::init();

    let seed = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(7);
    let config = GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    };
    let mut sim = Simulation::with_config(config)?;
    sim.start()?;

    // Level codes carry the level id, so the HUD listens to the first few.
    let mut codes = vec![channel::DIFFICULTY_UPDATED.to_string(), channel::PLAYER_DIED.to_string()];
    for id in 1..=16 {
        codes.push(channel::level_won(id));
        codes.push(channel::level_lost(id));
    }
    let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
    sim.add_observer(&codes, Box::new(Hud));

    let script = [KeyCode::ArrowRight, KeyCode::ArrowDown, KeyCode::ArrowLeft, KeyCode::ArrowUp];
    let dt = 1.0 / TICKS_PER_SECOND as f32;
    let mut held: Option<KeyCode> = None;
    let mut renderer = CountingRenderer::default();

    for tick in 0..TICKS_PER_SECOND * SECONDS {
        if tick % TICKS_PER_SECOND == 0 {
            if let Some(key) = held.take() {
                sim.input_mut().release_key(key);
            }
            let key = script[(tick / TICKS_PER_SECOND) as usize % script.len()];
            sim.input_mut().press_key(key);
            held = Some(key);
        }

        sim.update(dt)?;
        sim.render(&mut renderer);
    }

    let level = sim.levels().active().map(|l| l.id).unwrap_or(0);
    log::info!(
        "Simulated {:.1}s in {} ticks; ended on level {level} with {} lives; {} cubes drawn",
        sim.time().elapsed_secs(),
        sim.time().frame_count(),
        sim.levels().lives(),
        renderer.cubes,
    );
    Ok(())
}
