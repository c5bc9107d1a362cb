// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Scheduled movement simulation
//!
//! Demonstrates phases, Before/After ordering, resources, deferred commands
//! and plugins. Particles fall under gravity; the ones that leave the arena
//! are despawned through the command buffer and replaced by new spawns.
//!
//! Run with `RUST_LOG=debug` to see the schedule and command application.

use std::any::Any;

use archetype_ecs::ecs::{Component, EntityBuilder, Phase, PluginError, System, SystemDescriptor, World};
use archetype_ecs::plugins::{Plugin, PluginRegistry};

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Debug, Clone, Copy)]
struct Velocity {
    dx: f32,
    dy: f32,
}
impl Component for Velocity {}

#[derive(Debug, Clone, Copy)]
struct Gravity(f32);

#[derive(Debug, Default)]
struct Stats {
    frame: u32,
    respawned: u32,
}

struct ApplyGravity;

impl System for ApplyGravity {
    fn run(&mut self, world: &mut World) {
        let g = world.resource::<Gravity>().map_or(0.0, |g| g.0);
        let query = world.query::<(Velocity,)>();
        query.for_each(world.entities_mut(), |_, (v,)| v.dy += g);
    }
}

struct Integrate;

impl System for Integrate {
    fn run(&mut self, world: &mut World) {
        let query = world.query::<(Position, Velocity)>();
        query.for_each(world.entities_mut(), |_, (p, v)| {
            p.x += v.dx;
            p.y += v.dy;
        });
    }
}

/// Removes particles below the floor and queues a replacement for each
struct Recycle {
    floor: f32,
}

impl System for Recycle {
    fn run(&mut self, world: &mut World) {
        let (store, commands) = world.parts_mut();
        let query = store.query::<(Position,)>();
        let mut respawned = 0;
        for (entity, (p,)) in query.iter_mut(store) {
            if p.y < self.floor {
                commands.despawn(entity);
                commands.spawn_built(particle(p.x, 0.0));
                respawned += 1;
            }
        }
        if let Some(stats) = world.resource_mut::<Stats>() {
            stats.respawned += respawned;
        }
    }
}

struct Report;

impl System for Report {
    fn run(&mut self, world: &mut World) {
        let Some(stats) = world.resource_mut::<Stats>() else {
            return;
        };
        stats.frame += 1;
        let (frame, respawned) = (stats.frame, stats.respawned);
        println!(
            "frame {:>2}: {} particles, {} respawned so far",
            frame,
            world.entity_count(),
            respawned
        );
    }
}

fn particle(x: f32, y: f32) -> EntityBuilder {
    EntityBuilder::new()
        .with(Position { x, y })
        .with(Velocity { dx: 0.0, dy: 0.0 })
}

struct PhysicsPlugin {
    gravity: f32,
}

impl Plugin for PhysicsPlugin {
    fn name(&self) -> &str {
        "physics"
    }

    fn version(&self) -> &str {
        "0.2.0"
    }

    fn build(&mut self, world: &mut World) -> Result<(), PluginError> {
        world.insert_resource(Gravity(self.gravity));
        world.add_system(SystemDescriptor::new(Integrate).in_phase(Phase::FixedUpdate))?;
        world.add_system(
            SystemDescriptor::new(ApplyGravity)
                .in_phase(Phase::FixedUpdate)
                .before::<Integrate>(),
        )?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn name(&self) -> &str {
        "arena"
    }

    fn version(&self) -> &str {
        "0.2.0"
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["physics"]
    }

    fn build(&mut self, world: &mut World) -> Result<(), PluginError> {
        world.insert_resource(Stats::default());
        for i in 0..8 {
            world.spawn_with(particle(i as f32, i as f32 * 2.0));
        }
        world.add_system(SystemDescriptor::new(Recycle { floor: -10.0 }).in_phase(Phase::PostUpdate))?;
        world.add_system(SystemDescriptor::new(Report).in_phase(Phase::Last))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut world = World::new();
    let mut plugins = PluginRegistry::new();
    plugins.register(Box::new(ArenaPlugin))?;
    plugins.register(Box::new(PhysicsPlugin { gravity: -0.5 }))?;
    plugins.build_all(&mut world)?;
    println!("Plugins built in order: {:?}", plugins.load_order());

    world.initialize()?;
    for phase in Phase::ALL {
        let systems = world.system_order(phase);
        if !systems.is_empty() {
            println!("{:>12}: {}", phase.name(), systems.join(" -> "));
        }
    }
    println!();

    for _ in 0..10 {
        world.run_frame()?;
    }

    plugins.shutdown_all(&mut world)?;
    Ok(())
}
