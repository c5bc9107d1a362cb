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
//! Systems and their scheduling metadata
//!
//! A system is a unit of per-frame logic. It is registered with the world
//! wrapped in a [`SystemDescriptor`], which records the phase it runs in and
//! the other system types it must run before or after.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::ecs::{Phase, World};

/// Trait for systems that operate on the ECS world
pub trait System: Send + Sync + 'static {
    /// Execute the system on the world
    fn run(&mut self, world: &mut World);

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// A system together with its phase and ordering constraints
///
/// Constraints name other system *types*. A constraint referencing a type
/// that has no instance in the same phase is ignored when the schedule is
/// built.
///
/// # Examples
///
/// ```
/// use archetype_ecs::ecs::{Phase, System, SystemDescriptor, World};
///
/// struct Physics;
/// impl System for Physics {
///     fn run(&mut self, _world: &mut World) {}
/// }
///
/// struct Render;
/// impl System for Render {
///     fn run(&mut self, _world: &mut World) {}
/// }
///
/// let descriptor = SystemDescriptor::new(Physics)
///     .in_phase(Phase::FixedUpdate)
///     .before::<Render>();
/// assert_eq!(descriptor.phase(), Phase::FixedUpdate);
/// ```
pub struct SystemDescriptor {
    system: Box<dyn System>,
    system_type: TypeId,
    phase: Phase,
    run_before: Vec<TypeId>,
    run_after: Vec<TypeId>,
}

impl SystemDescriptor {
    /// Wrap a system, placing it in [`Phase::Update`]
    pub fn new<S: System>(system: S) -> Self {
        SystemDescriptor {
            system: Box::new(system),
            system_type: TypeId::of::<S>(),
            phase: Phase::Update,
            run_before: Vec::new(),
            run_after: Vec::new(),
        }
    }

    /// Run in the given phase
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Run before every system of type `S` in the same phase
    pub fn before<S: System>(mut self) -> Self {
        let id = TypeId::of::<S>();
        if !self.run_before.contains(&id) {
            self.run_before.push(id);
        }
        self
    }

    /// Run after every system of type `S` in the same phase
    pub fn after<S: System>(mut self) -> Self {
        let id = TypeId::of::<S>();
        if !self.run_after.contains(&id) {
            self.run_after.push(id);
        }
        self
    }

    /// Phase this system runs in
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `TypeId` of the wrapped system
    pub fn system_type(&self) -> TypeId {
        self.system_type
    }

    /// System types this one must precede
    pub fn run_before(&self) -> &[TypeId] {
        &self.run_before
    }

    /// System types this one must follow
    pub fn run_after(&self) -> &[TypeId] {
        &self.run_after
    }

    /// Name of the wrapped system
    pub fn name(&self) -> &str {
        self.system.name()
    }

    pub(crate) fn into_system(self) -> Box<dyn System> {
        self.system
    }
}

impl<S: System> From<S> for SystemDescriptor {
    fn from(system: S) -> Self {
        SystemDescriptor::new(system)
    }
}

impl fmt::Debug for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("name", &self.name())
            .field("phase", &self.phase)
            .field("run_before", &self.run_before.len())
            .field("run_after", &self.run_after.len())
            .finish()
    }
}
