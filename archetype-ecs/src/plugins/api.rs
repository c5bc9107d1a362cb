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
//! Plugin API
//!
//! A plugin bundles setup for a [`World`]: it may register components,
//! insert resources, spawn entities and add systems. Plugins are built once,
//! in dependency order, before the world's schedule is initialized.
//!
//! # Contracts
//!
//! Plugins must:
//! - Use a name that is unique within a registry
//! - Declare every plugin they rely on in [`Plugin::dependencies`]
//! - Leave the world's schedule uninitialized

use std::any::Any;

use crate::ecs::{PluginError, World};

/// Version of the plugin API
///
/// Format: MAJOR.MINOR.PATCH following semantic versioning.
pub const PLUGIN_API_VERSION: &str = "0.2.0";

/// Setup hooks for world extensions
pub trait Plugin: Send + Sync {
    /// Get the name of this plugin
    ///
    /// Must be unique across all registered plugins.
    fn name(&self) -> &str;

    /// Get the version of this plugin (MAJOR.MINOR.PATCH)
    fn version(&self) -> &str;

    /// Get the plugin API version this plugin was built against
    fn api_version(&self) -> &str {
        PLUGIN_API_VERSION
    }

    /// Names of plugins that must be built before this one
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Install the plugin into `world`
    ///
    /// Called once. Systems added here may carry Before/After constraints
    /// on systems from dependencies, since all of them land in the same
    /// schedule.
    ///
    /// # Errors
    ///
    /// Scheduling errors convert into [`PluginError`] with `?`; other
    /// failures should be reported as [`PluginError::Build`].
    fn build(&mut self, world: &mut World) -> Result<(), PluginError>;

    /// Release what the plugin set up
    ///
    /// Called in reverse build order by
    /// [`PluginRegistry::shutdown_all`](crate::plugins::PluginRegistry::shutdown_all).
    fn shutdown(&mut self, _world: &mut World) -> Result<(), PluginError> {
        Ok(())
    }

    /// Allow downcasting to concrete plugin types
    fn as_any(&self) -> &dyn Any;

    /// Allow mutable downcasting to concrete plugin types
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
