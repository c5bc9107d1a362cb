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
//! Phase-based system scheduler
//!
//! Systems are collected per [`Phase`] while the world is being set up. On
//! [`Scheduler::initialize`] each phase is ordered once with Kahn's algorithm
//! over the systems' Before/After constraints. The resulting order is fixed
//! for the lifetime of the scheduler. Ready systems run in a deterministic
//! FIFO order seeded by registration order, so the same configuration
//! always produces the same schedule.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};

use crate::ecs::graph::topological_order;
use crate::ecs::{ScheduleError, System, SystemDescriptor};

/// Named bucket of systems executed together
///
/// Phases run in declaration order within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Start of the frame
    First,
    /// Before the main update
    PreUpdate,
    /// Fixed-timestep simulation
    FixedUpdate,
    /// Main update
    Update,
    /// After the main update
    PostUpdate,
    /// End of the simulation part of the frame
    Last,
    /// Extract and prepare data for rendering
    PrepareFrame,
    /// Rendering
    Render,
    /// After rendering
    PostRender,
}

impl Phase {
    /// Every phase in execution order
    pub const ALL: [Phase; 9] = [
        Phase::First,
        Phase::PreUpdate,
        Phase::FixedUpdate,
        Phase::Update,
        Phase::PostUpdate,
        Phase::Last,
        Phase::PrepareFrame,
        Phase::Render,
        Phase::PostRender,
    ];

    /// Phase name as written in the enum
    pub fn name(self) -> &'static str {
        match self {
            Phase::First => "First",
            Phase::PreUpdate => "PreUpdate",
            Phase::FixedUpdate => "FixedUpdate",
            Phase::Update => "Update",
            Phase::PostUpdate => "PostUpdate",
            Phase::Last => "Last",
            Phase::PrepareFrame => "PrepareFrame",
            Phase::Render => "Render",
            Phase::PostRender => "PostRender",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// System scheduler with one precomputed order per phase
///
/// # Examples
///
/// ```
/// use archetype_ecs::ecs::{Phase, Scheduler, System, SystemDescriptor, World};
///
/// struct Integrate;
/// impl System for Integrate {
///     fn run(&mut self, _world: &mut World) {}
/// }
///
/// struct Collide;
/// impl System for Collide {
///     fn run(&mut self, _world: &mut World) {}
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_system(SystemDescriptor::new(Collide).after::<Integrate>()).unwrap();
/// scheduler.add_system(Integrate.into()).unwrap();
/// scheduler.initialize().unwrap();
///
/// let order = scheduler.system_names(Phase::Update);
/// assert!(order[0].ends_with("Integrate"));
/// ```
#[derive(Default)]
pub struct Scheduler {
    pending: Vec<SystemDescriptor>,
    schedule: HashMap<Phase, Vec<Box<dyn System>>>,
    initialized: bool,
}

impl Scheduler {
    /// Create an empty, uninitialized scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a system for scheduling
    ///
    /// Fails once the schedule has been built.
    pub fn add_system(&mut self, descriptor: SystemDescriptor) -> Result<(), ScheduleError> {
        if self.initialized {
            return Err(ScheduleError::AlreadyInitialized {
                system: descriptor.name().to_string(),
            });
        }
        debug!(
            "queued system {} in phase {}",
            descriptor.name(),
            descriptor.phase()
        );
        self.pending.push(descriptor);
        Ok(())
    }

    /// Build the per-phase execution orders
    ///
    /// Either every phase is ordered and the scheduler becomes initialized,
    /// or an error is returned and nothing is scheduled. On a cycle the
    /// queued systems are kept so the configuration can be inspected.
    pub fn initialize(&mut self) -> Result<(), ScheduleError> {
        if self.initialized {
            return Err(ScheduleError::InitializedTwice);
        }

        let mut orders: Vec<(Phase, Vec<usize>)> = Vec::new();
        for phase in Phase::ALL {
            let members: Vec<usize> = self
                .pending
                .iter()
                .enumerate()
                .filter(|(_, descriptor)| descriptor.phase() == phase)
                .map(|(index, _)| index)
                .collect();
            if members.is_empty() {
                continue;
            }

            let order = self.order_phase(phase, &members)?;
            orders.push((phase, order));
        }

        let mut slots: Vec<Option<Box<dyn System>>> = self
            .pending
            .drain(..)
            .map(|descriptor| Some(descriptor.into_system()))
            .collect();

        let mut total = 0;
        for (phase, order) in orders {
            let systems: Vec<Box<dyn System>> =
                order.into_iter().filter_map(|index| slots[index].take()).collect();
            debug!(
                "phase {} order: [{}]",
                phase,
                systems.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
            );
            total += systems.len();
            self.schedule.insert(phase, systems);
        }

        self.initialized = true;
        info!(
            "schedule initialized: {} systems across {} phases",
            total,
            self.schedule.len()
        );
        Ok(())
    }

    /// Order one phase, returning indices into `pending`
    fn order_phase(&self, phase: Phase, members: &[usize]) -> Result<Vec<usize>, ScheduleError> {
        let types: Vec<TypeId> = members
            .iter()
            .map(|&index| self.pending[index].system_type())
            .collect();

        // Local node ids are positions in `members`.
        let mut edges = Vec::new();
        for (node, &index) in members.iter().enumerate() {
            let descriptor = &self.pending[index];
            for target in descriptor.run_before() {
                for (other, ty) in types.iter().enumerate() {
                    if ty == target {
                        edges.push((node, other));
                    }
                }
            }
            for source in descriptor.run_after() {
                for (other, ty) in types.iter().enumerate() {
                    if ty == source {
                        edges.push((other, node));
                    }
                }
            }
        }

        match topological_order(members.len(), &edges) {
            Ok(order) => Ok(order.into_iter().map(|node| members[node]).collect()),
            Err(blocked) => {
                let systems: Vec<String> = blocked
                    .into_iter()
                    .map(|node| self.pending[members[node]].name().to_string())
                    .collect();
                warn!(
                    "cycle in ordering constraints of phase {}: {}",
                    phase,
                    systems.join(", ")
                );
                Err(ScheduleError::Cycle { phase, systems })
            }
        }
    }

    /// Whether [`initialize`](Self::initialize) has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of systems, queued or scheduled
    pub fn system_count(&self) -> usize {
        self.pending.len() + self.schedule.values().map(Vec::len).sum::<usize>()
    }

    /// Names of the systems in a phase, in execution order
    ///
    /// Before initialization, lists the queued systems in registration order.
    pub fn system_names(&self, phase: Phase) -> Vec<&str> {
        if self.initialized {
            self.schedule
                .get(&phase)
                .map(|systems| systems.iter().map(|s| s.name()).collect())
                .unwrap_or_default()
        } else {
            self.pending
                .iter()
                .filter(|d| d.phase() == phase)
                .map(|d| d.name())
                .collect()
        }
    }

    /// Move a phase's systems out so they can borrow the world mutably
    ///
    /// Must be paired with [`restore_phase`](Self::restore_phase).
    pub(crate) fn take_phase(&mut self, phase: Phase) -> Result<Vec<Box<dyn System>>, ScheduleError> {
        if !self.initialized {
            return Err(ScheduleError::NotInitialized);
        }
        Ok(self
            .schedule
            .get_mut(&phase)
            .map(std::mem::take)
            .unwrap_or_default())
    }

    pub(crate) fn restore_phase(&mut self, phase: Phase, systems: Vec<Box<dyn System>>) {
        if !systems.is_empty() {
            self.schedule.insert(phase, systems);
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("initialized", &self.initialized)
            .field("systems", &self.system_count())
            .finish()
    }
}
