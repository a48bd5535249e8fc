//! Command-line runner for guard scenarios.
//!
//! Loads a JSON scenario and steps it either through the headless world or
//! through the Bevy plugin, logging every guard event.
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use log::{info, warn};
use nightwatch::plugin::{
    GuardAgent, GuardAiPlugin, HealthComp, IntruderComp, LevelGeometry, NoiseBroadcast,
    QueuedBroadcasts,
};
use nightwatch::scenario::{Scenario, ScenarioRunner, TimedNoise};
use nightwatch::{init_logging, NoiseEmission, NoiseSystem, SegmentWorld};

/// Runs guard and noise scenarios without a renderer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file in JSON
    #[arg(short, long)]
    scenario: PathBuf,
    /// Simulated seconds
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    /// Simulation frames per second
    #[arg(long, default_value_t = 30.0)]
    fps: f32,
    /// Drive the scenario through the Bevy plugin instead of the headless world
    #[arg(long)]
    ecs: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn run_headless(scenario: &Scenario, args: &Args) -> Result<()> {
    let mut runner = ScenarioRunner::new(scenario, args.fps)?;
    let summary = runner.run(args.seconds);
    for timed in &summary.events {
        info!("{:>7.2}s {:?}", timed.time, timed.event);
    }
    match summary.intruder_health {
        Some(0) => info!("intruder was taken down"),
        Some(health) => info!("intruder survived with {health} health"),
        None => info!("no intruder in scenario"),
    }
    Ok(())
}

fn run_ecs(scenario: &Scenario, args: &Args) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("frame rate must be positive, got {}", args.fps);
    }
    let dt = 1.0 / args.fps;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(GuardAiPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(dt)));
    app.insert_resource(LevelGeometry(SegmentWorld::with_walls(scenario.walls.clone())));

    for brain in scenario.build_guards()? {
        let pose = brain.pose();
        app.world_mut().spawn((
            GuardAgent(brain),
            Transform::from_xyz(pose.position.x, pose.position.y, 0.0),
        ));
    }
    let intruder = scenario.intruder.as_ref().map(|entry| {
        if !entry.route.is_empty() {
            warn!("intruder routes are only walked by the headless runner");
        }
        app.world_mut()
            .spawn((
                IntruderComp,
                HealthComp(entry.health),
                Transform::from_xyz(entry.position.x, entry.position.y, 0.0),
            ))
            .id()
    });

    let mut timeline = scenario.timeline();
    timeline.reverse();
    let frames = (args.seconds * args.fps).round();
    let mut now = 0.0_f32;
    let mut frame = 0.0_f32;
    while frame < frames {
        while timeline.last().is_some_and(|n| n.at() <= now) {
            let Some(noise) = timeline.pop() else {
                break;
            };
            emit(app.world_mut(), &noise);
        }
        app.update();
        now += dt;
        frame += 1.0;
    }

    if let Some(health) = intruder.and_then(|e| app.world().get::<HealthComp>(e)) {
        info!("intruder finished with {} health", health.0);
    }
    Ok(())
}

fn emit(world: &mut World, noise: &TimedNoise) {
    match *noise {
        TimedNoise::Pulse {
            origin,
            radius,
            expand_speed,
            linger,
            mask,
            notify_interval,
            ..
        } => {
            world.resource_mut::<NoiseSystem>().emit(
                NoiseEmission::new(origin, radius, expand_speed, linger, mask)
                    .with_notify_interval(notify_interval),
            );
        }
        TimedNoise::Broadcast {
            origin,
            radius,
            intensity,
            ..
        } => {
            world
                .resource_mut::<QueuedBroadcasts>()
                .0
                .push(NoiseBroadcast {
                    origin,
                    radius,
                    intensity,
                });
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    info!(
        "running {} guard(s) for {}s at {} fps",
        scenario.guards.len(),
        args.seconds,
        args.fps
    );
    if args.ecs {
        run_ecs(&scenario, &args)
    } else {
        run_headless(&scenario, &args)
    }
}
