//! Tri Swarm headless runner
//!
//! Drives a world with jittered frame deltas and a wandering input, then
//! logs a summary. Usage: `tri-swarm [config.json] [frames]`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use tri_swarm::input::Key;
use tri_swarm::render::{ActorInstance, collect_instances};
use tri_swarm::{SimError, World, WorldConfig};

const DEFAULT_FRAMES: u32 = 600;
const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

fn main() {
    env_logger::init();
    log::info!("Tri Swarm (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), SimError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n.parse().unwrap_or_else(|_| {
            log::warn!("Invalid frame count {:?}, using {}", n, DEFAULT_FRAMES);
            DEFAULT_FRAMES
        }),
        None => DEFAULT_FRAMES,
    };

    let mut jitter = Pcg32::seed_from_u64(config.seed ^ 0x5eed);
    let mut world = World::new(config)?;
    let mut instances: Vec<ActorInstance> = Vec::with_capacity(world.config.capacity);
    let keys = [Key::Left, Key::Right, Key::Up, Key::Down];

    let mut steps = 0;
    for frame in 0..frames {
        // Change held keys twice a second at 60 Hz
        if frame % 30 == 0 {
            let key = keys[jitter.random_range(0..keys.len())];
            world.player.input.focus_lost();
            world.player.input.set_key(key, true);

            let mouse = Vec2::new(
                jitter.random_range(0.0..VIEWPORT.x),
                jitter.random_range(0.0..VIEWPORT.y),
            );
            world.camera.set_mouse_screen(mouse, VIEWPORT);
        }

        let dt = 1.0 / 60.0 + jitter.random_range(-0.004..0.004);
        steps += world.update(dt);
        collect_instances(&world, &mut instances);
        log::trace!("frame {}: {} instances", frame, instances.len());
    }

    log::info!(
        "Ran {} frames, {} physics steps, {} enemies, {} allies",
        frames,
        steps,
        world.actors.enemies().len(),
        world.actors.allies().len()
    );
    if let Some(pos) = world.player_position() {
        log::info!("Player ended at ({:.2}, {:.2})", pos.x, pos.y);
    }

    world.shutdown();
    Ok(())
}
