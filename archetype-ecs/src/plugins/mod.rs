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
//! Plugin system for packaging world setup
//!
//! A plugin registers components, resources and systems on a
//! [`World`](crate::ecs::World) without the application wiring each piece by
//! hand.
//!
//! # Features
//!
//! - **Static Registration**: plugins are ordinary values handed to a [`PluginRegistry`]
//! - **Dependency Management**: dependencies build first; cycles are rejected
//! - **Version Checking**: API version compatibility validated with `semver`
//!
//! # Dependency Management
//!
//! Plugins can declare dependencies on other plugins:
//!
//! ```rust,ignore
//! impl Plugin for MyPlugin {
//!     fn dependencies(&self) -> Vec<&str> {
//!         vec!["movement", "collision"]
//!     }
//! }
//! ```
//!
//! The registry will:
//! - Verify all dependencies are registered
//! - Build plugins in dependency order
//! - Detect and reject circular dependencies
//!
//! # Version Compatibility
//!
//! The plugin API follows semantic versioning. For 0.x releases a minor bump
//! is breaking; from 1.0 on, a plugin built against an older minor version
//! keeps working. Plugins declare the version they target through
//! [`Plugin::api_version`], which defaults to [`PLUGIN_API_VERSION`].

pub mod api;
pub mod registry;

pub use api::{Plugin, PLUGIN_API_VERSION};
pub use registry::PluginRegistry;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let version = semver::Version::parse(PLUGIN_API_VERSION).unwrap();
        assert_eq!(version.major, 0);
        assert_eq!(PluginRegistry::new().plugin_count(), 0);
    }
}
