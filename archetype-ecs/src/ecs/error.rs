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
//! Error types for scheduling and plugin setup
//!
//! Only configuration mistakes surface as errors. Operations on stale entity
//! handles are tolerated and never produce an error value.

use thiserror::Error;

use crate::ecs::Phase;

/// Invalid scheduler usage or configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A system was registered after the schedule was built
    #[error("cannot register system '{system}' after the schedule has been initialized")]
    AlreadyInitialized {
        /// Name of the rejected system
        system: String,
    },

    /// The schedule was built twice
    #[error("schedule is already initialized")]
    InitializedTwice,

    /// Before/After constraints inside one phase form a cycle
    #[error("circular ordering constraints in phase {phase}: {}", systems.join(", "))]
    Cycle {
        /// Phase whose constraints could not be satisfied
        phase: Phase,
        /// Systems left unordered (members of, or blocked by, the cycle)
        systems: Vec<String>,
    },

    /// A phase was run before the schedule was built
    #[error("schedule has not been initialized")]
    NotInitialized,
}

/// Plugin registration or installation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// Two plugins share a name
    #[error("plugin '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The plugin targets an incompatible plugin API
    #[error("plugin '{plugin}' API version {found} is incompatible with engine API version {expected}")]
    IncompatibleVersion {
        /// Plugin name
        plugin: String,
        /// Version the plugin was built against
        found: String,
        /// Version this engine provides
        expected: String,
    },

    /// A version string is not valid semver
    #[error("plugin '{plugin}' has an invalid version '{version}'")]
    InvalidVersion {
        /// Plugin name
        plugin: String,
        /// Offending version string
        version: String,
    },

    /// A dependency is not registered
    #[error("plugin '{plugin}' depends on '{dependency}' which is not registered")]
    MissingDependency {
        /// Dependent plugin
        plugin: String,
        /// Missing plugin name
        dependency: String,
    },

    /// Plugin dependencies form a cycle
    #[error("circular dependency between plugins: {}", .0.join(", "))]
    CircularDependency(Vec<String>),

    /// Plugins must be installed before the world's schedule is built
    #[error("cannot install plugin '{0}' into an initialized world")]
    WorldInitialized(String),

    /// The plugin reported a failure while building
    #[error("failed to build plugin '{plugin}': {message}")]
    Build {
        /// Plugin name
        plugin: String,
        /// Message reported by the plugin
        message: String,
    },

    /// The plugin reported a failure while shutting down
    #[error("failed to shut down plugin '{plugin}': {message}")]
    Shutdown {
        /// Plugin name
        plugin: String,
        /// Message reported by the plugin
        message: String,
    },

    /// A system registered by the plugin was rejected
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
