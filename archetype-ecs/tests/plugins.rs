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
//! Plugins installing components, resources and ordered systems

use std::any::Any;

use archetype_ecs::ecs::{
    Component, Phase, PluginError, ScheduleError, System, SystemDescriptor, World,
};
use archetype_ecs::plugins::{Plugin, PluginRegistry, PLUGIN_API_VERSION};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position(f32);
impl Component for Position {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity(f32);
impl Component for Velocity {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gravity(f32);

struct ApplyGravity;

impl System for ApplyGravity {
    fn run(&mut self, world: &mut World) {
        let Some(&Gravity(g)) = world.resource::<Gravity>() else {
            return;
        };
        let query = world.query::<(Velocity,)>();
        query.for_each(world.entities_mut(), |_, (v,)| v.0 += g);
    }
}

struct Integrate;

impl System for Integrate {
    fn run(&mut self, world: &mut World) {
        let query = world.query::<(Position, Velocity)>();
        query.for_each(world.entities_mut(), |_, (p, v)| p.0 += v.0);
    }
}

struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn name(&self) -> &str {
        "movement"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn build(&mut self, world: &mut World) -> Result<(), PluginError> {
        world.entities_mut().register_component::<Position>();
        world.entities_mut().register_component::<Velocity>();
        world.add_system(SystemDescriptor::new(Integrate).in_phase(Phase::FixedUpdate))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct GravityPlugin {
    strength: f32,
}

impl Plugin for GravityPlugin {
    fn name(&self) -> &str {
        "gravity"
    }

    fn version(&self) -> &str {
        "0.3.1"
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["movement"]
    }

    fn build(&mut self, world: &mut World) -> Result<(), PluginError> {
        if !self.strength.is_finite() {
            return Err(PluginError::Build {
                plugin: self.name().to_string(),
                message: "gravity must be finite".to_string(),
            });
        }
        world.insert_resource(Gravity(self.strength));
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

/// Seals the schedule during its own build, then tries to add a system
struct EagerPlugin;

impl Plugin for EagerPlugin {
    fn name(&self) -> &str {
        "eager"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn build(&mut self, world: &mut World) -> Result<(), PluginError> {
        world.initialize()?;
        world.add_system(SystemDescriptor::new(Integrate).in_phase(Phase::Update))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_plugins_build_in_dependency_order() {
    let mut world = World::new();
    let mut registry = PluginRegistry::new();
    registry
        .register(Box::new(GravityPlugin { strength: -1.0 }))
        .unwrap();
    registry.register(Box::new(MovementPlugin)).unwrap();
    registry.build_all(&mut world).unwrap();
    assert_eq!(registry.load_order(), &["movement", "gravity"]);

    world.initialize().unwrap();
    let order = world.system_order(Phase::FixedUpdate);
    assert_eq!(order.len(), 2);
    assert!(order[0].ends_with("ApplyGravity"));
    assert!(order[1].ends_with("Integrate"));

    let e = world.spawn();
    world.add_component(e, Position(10.0));
    world.add_component(e, Velocity(0.0));
    world.run_frame().unwrap();
    world.run_frame().unwrap();

    assert_eq!(world.get_component::<Velocity>(e), Some(&Velocity(-2.0)));
    assert_eq!(world.get_component::<Position>(e), Some(&Position(7.0)));
}

#[test]
fn test_plugin_failure_is_reported() {
    let mut world = World::new();
    let mut registry = PluginRegistry::new();
    registry.register(Box::new(MovementPlugin)).unwrap();
    registry
        .register(Box::new(GravityPlugin {
            strength: f32::NAN,
        }))
        .unwrap();

    let error = registry.build_all(&mut world).unwrap_err();
    assert_eq!(
        error.to_string(),
        "failed to build plugin 'gravity': gravity must be finite"
    );
    assert!(registry.is_built("movement"));
    assert!(world.resource::<Gravity>().is_none());
}

#[test]
fn test_plugin_after_initialize_is_rejected() {
    let mut world = World::new();
    world.initialize().unwrap();
    let mut registry = PluginRegistry::new();
    registry.register(Box::new(MovementPlugin)).unwrap();
    assert_eq!(
        registry.build_all(&mut world),
        Err(PluginError::WorldInitialized("movement".to_string()))
    );
}

#[test]
fn test_downcast_registered_plugin() {
    let mut registry = PluginRegistry::new();
    registry
        .register(Box::new(GravityPlugin { strength: 3.0 }))
        .unwrap();
    registry.get_as_mut::<GravityPlugin>("gravity").unwrap().strength = 4.0;
    assert_eq!(
        registry.get_as::<GravityPlugin>("gravity").map(|p| p.strength),
        Some(4.0)
    );
    assert!(registry.get_as::<MovementPlugin>("gravity").is_none());
    assert_eq!(registry.get("gravity").map(|p| p.api_version()), Some(PLUGIN_API_VERSION));
}

#[test]
fn test_schedule_error_from_plugin_keeps_its_variant() {
    let mut world = World::new();
    let mut registry = PluginRegistry::new();
    registry.register(Box::new(EagerPlugin)).unwrap();

    let result = registry.build_all(&mut world);
    assert!(matches!(
        result,
        Err(PluginError::Schedule(ScheduleError::AlreadyInitialized { .. }))
    ));
    assert!(!registry.is_built("eager"));
    assert!(registry.load_order().is_empty());
}
