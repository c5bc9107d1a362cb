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
//! Plugin registry and loader
//!
//! This module provides the registry for managing plugins, including:
//! - Static registration via direct API calls
//! - Version compatibility checking
//! - Dependency resolution and circular dependency detection
//!
//! Plugins are kept in registration order, which is also the tie-break when
//! several plugins are ready to build at the same time.

use log::{debug, info};
use semver::Version;

use crate::ecs::{topological_order, PluginError, World};
use crate::plugins::api::{Plugin, PLUGIN_API_VERSION};

struct Entry {
    plugin: Box<dyn Plugin>,
    built: bool,
}

/// Plugin registry for managing and building plugins
///
/// # Examples
///
/// ```
/// use std::any::Any;
/// use archetype_ecs::ecs::{PluginError, World};
/// use archetype_ecs::plugins::{Plugin, PluginRegistry};
///
/// struct Gravity(f32);
///
/// impl Plugin for Gravity {
///     fn name(&self) -> &str { "gravity" }
///     fn version(&self) -> &str { "1.0.0" }
///     fn build(&mut self, world: &mut World) -> Result<(), PluginError> {
///         world.insert_resource(self.0);
///         Ok(())
///     }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// let mut world = World::new();
/// let mut registry = PluginRegistry::new();
/// registry.register(Box::new(Gravity(-9.81))).unwrap();
/// registry.build_all(&mut world).unwrap();
/// assert_eq!(world.resource::<f32>(), Some(&-9.81));
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<Entry>,
    /// Names of built plugins, in build order
    load_order: Vec<String>,
}

impl PluginRegistry {
    /// Create a new plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    ///
    /// # Errors
    ///
    /// - A plugin with the same name is already registered
    /// - The plugin's version or API version is not valid semver
    /// - The plugin API version is incompatible with [`PLUGIN_API_VERSION`]
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();

        if self.position(&name).is_some() {
            return Err(PluginError::AlreadyRegistered(name));
        }

        if Version::parse(plugin.version()).is_err() {
            return Err(PluginError::InvalidVersion {
                plugin: name,
                version: plugin.version().to_string(),
            });
        }

        let api_version = plugin.api_version();
        if !is_version_compatible(&name, api_version, PLUGIN_API_VERSION)? {
            return Err(PluginError::IncompatibleVersion {
                plugin: name,
                found: api_version.to_string(),
                expected: PLUGIN_API_VERSION.to_string(),
            });
        }

        debug!("registered plugin {} {}", name, plugin.version());
        self.entries.push(Entry {
            plugin,
            built: false,
        });
        Ok(())
    }

    /// Build every plugin that has not been built yet
    ///
    /// Dependencies are built first. Plugins registered after an earlier
    /// call are picked up by the next one.
    ///
    /// # Errors
    ///
    /// - The world's schedule is already initialized
    /// - A dependency is not registered
    /// - Dependencies form a cycle
    /// - A plugin's `build` fails; its error is returned unchanged and
    ///   plugins built before it stay built
    pub fn build_all(&mut self, world: &mut World) -> Result<(), PluginError> {
        let pending: Vec<usize> = (0..self.entries.len())
            .filter(|&index| !self.entries[index].built)
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        if world.is_initialized() {
            let name = self.entries[pending[0]].plugin.name().to_string();
            return Err(PluginError::WorldInitialized(name));
        }

        let order = self.resolve(&pending)?;

        for index in order {
            let entry = &mut self.entries[index];
            let name = entry.plugin.name().to_string();
            debug!("building plugin {}", name);
            entry.plugin.build(world)?;
            entry.built = true;
            self.load_order.push(name);
        }

        info!("built {} plugin(s)", pending.len());
        Ok(())
    }

    /// Build order over the unbuilt plugins at `pending`
    fn resolve(&self, pending: &[usize]) -> Result<Vec<usize>, PluginError> {
        let mut edges = Vec::new();
        for (node, &index) in pending.iter().enumerate() {
            let plugin = &self.entries[index].plugin;
            for dependency in plugin.dependencies() {
                let Some(dep_index) = self.position(dependency) else {
                    return Err(PluginError::MissingDependency {
                        plugin: plugin.name().to_string(),
                        dependency: dependency.to_string(),
                    });
                };
                if let Some(dep_node) = pending.iter().position(|&p| p == dep_index) {
                    edges.push((dep_node, node));
                }
            }
        }

        topological_order(pending.len(), &edges)
            .map(|order| order.into_iter().map(|node| pending[node]).collect())
            .map_err(|blocked| {
                PluginError::CircularDependency(
                    blocked
                        .into_iter()
                        .map(|node| self.entries[pending[node]].plugin.name().to_string())
                        .collect(),
                )
            })
    }

    /// Shut down built plugins in reverse build order
    ///
    /// Stops at the first failure; plugins already shut down are removed
    /// from the load order.
    pub fn shutdown_all(&mut self, world: &mut World) -> Result<(), PluginError> {
        while let Some(name) = self.load_order.pop() {
            let Some(index) = self.position(&name) else {
                continue;
            };
            let entry = &mut self.entries[index];
            entry.built = false;
            match entry.plugin.shutdown(world) {
                Ok(()) => {}
                Err(error @ PluginError::Shutdown { .. }) => return Err(error),
                Err(error) => {
                    return Err(PluginError::Shutdown {
                        plugin: name,
                        message: error.to_string(),
                    })
                }
            }
            debug!("shut down plugin {}", name);
        }
        Ok(())
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.position(name).map(|index| self.entries[index].plugin.as_ref())
    }

    /// Get a plugin by name, downcast to its concrete type
    pub fn get_as<P: Plugin + 'static>(&self, name: &str) -> Option<&P> {
        self.get(name)?.as_any().downcast_ref::<P>()
    }

    /// Get a mutable plugin by name, downcast to its concrete type
    pub fn get_as_mut<P: Plugin + 'static>(&mut self, name: &str) -> Option<&mut P> {
        let index = self.position(name)?;
        self.entries[index].plugin.as_any_mut().downcast_mut::<P>()
    }

    /// Get the number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether a plugin has been built
    pub fn is_built(&self, name: &str) -> bool {
        self.position(name)
            .map(|index| self.entries[index].built)
            .unwrap_or(false)
    }

    /// Names of built plugins, in the order they were built
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.plugin.name() == name)
    }
}

/// Check if a plugin API version is compatible with the engine
///
/// Uses semantic versioning rules:
/// - Major version must match
/// - For major version 0, minor versions must match (breaking changes)
/// - For major version >= 1, the plugin's minor version must not exceed the
///   engine's
/// - Patch version is ignored
fn is_version_compatible(plugin: &str, plugin_version: &str, engine_version: &str) -> Result<bool, PluginError> {
    let invalid = |version: &str| PluginError::InvalidVersion {
        plugin: plugin.to_string(),
        version: version.to_string(),
    };
    let plugin_ver = Version::parse(plugin_version).map_err(|_| invalid(plugin_version))?;
    let engine_ver = Version::parse(engine_version).map_err(|_| invalid(engine_version))?;

    if plugin_ver.major != engine_ver.major {
        return Ok(false);
    }

    if plugin_ver.major != 0 {
        Ok(plugin_ver.minor <= engine_ver.minor)
    } else {
        Ok(plugin_ver.minor == engine_ver.minor)
    }
}
