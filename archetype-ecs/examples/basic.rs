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
//! Basic example demonstrating the ECS structure
//!
//! Creates a world, spawns entities, changes their components and watches
//! them move between archetypes.
//!
//! Run with `RUST_LOG=trace` to see archetype creation and migrations.

use archetype_ecs::ecs::{Component, EntityBuilder, World};

#[derive(Debug)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {}

#[derive(Debug)]
struct Velocity {
    dx: f32,
    dy: f32,
}

impl Component for Velocity {}

#[derive(Debug)]
struct Player;

impl Component for Player {}

fn print_archetypes(world: &World) {
    for archetype in world.entities().archetypes() {
        let names: Vec<&str> = archetype
            .signature()
            .ids()
            .iter()
            .filter_map(|&id| world.entities().registry().name_of(id))
            .collect();
        println!(
            "  {} [{}]: {} entities",
            archetype.id(),
            names.join(", "),
            archetype.len()
        );
    }
}

fn main() {
    env_logger::init();

    println!("Archetype ECS - Basic Example");
    println!("=============================\n");

    let mut world = World::new();
    println!("Created new world");

    let player = world.spawn_with(
        EntityBuilder::new()
            .with(Player)
            .with(Position { x: 0.0, y: 0.0 })
            .with(Velocity { dx: 1.0, dy: 0.5 }),
    );
    println!("Spawned player {}", player);

    let rock = world.spawn();
    world.add_component(rock, Position { x: 5.0, y: 5.0 });
    println!("Spawned rock {}", rock);

    let comet = world.spawn();
    world.add_component(comet, Position { x: -3.0, y: 2.0 });
    world.add_component(comet, Velocity { dx: 0.0, dy: -2.0 });
    println!("Spawned comet {}\n", comet);

    println!("Archetypes:");
    print_archetypes(&world);

    println!("\nMoving everything with a velocity for three steps...");
    let query = world.query::<(Position, Velocity)>();
    for _ in 0..3 {
        query.for_each(world.entities_mut(), |_, (p, v)| {
            p.x += v.dx;
            p.y += v.dy;
        });
    }
    for (entity, (position,)) in world.query::<(Position,)>().iter_mut(world.entities_mut()) {
        println!("  {} at ({:.1}, {:.1})", entity, position.x, position.y);
    }

    println!("\nThe rock starts drifting; the comet burns up.");
    world.add_component(rock, Velocity { dx: 0.1, dy: 0.0 });
    world.despawn(comet);
    println!("Comet alive: {}", world.is_alive(comet));

    let recycled = world.spawn();
    println!(
        "New entity {} reuses index {} with generation {}",
        recycled,
        recycled.index(),
        recycled.generation()
    );

    println!("\nArchetypes:");
    print_archetypes(&world);
    println!("\nTotal entities: {}", world.entity_count());
}
