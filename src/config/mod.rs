//! Configuration loading and management

use crate::core::entity::Resource;
use crate::core::error::{ConfigError, ConsoleError, ConsoleResult};
use crate::core::filter::{FilterEngine, FilterSpec};
use crate::core::pagination::{DEFAULT_MAX_VISIBLE, Pager};
use crate::core::query::ListParams;
use crate::core::remote::RemoteController;
use crate::resources::{Device, Operator, Region, Service};
use crate::storage::HttpDataSource;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (e.g., "127.0.0.1:3000")
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Settings of remote controllers talking to a resource API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API root, e.g. `http://localhost:3000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_visible_pages")]
    pub max_visible_pages: usize,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// First-page list parameters using the configured page size
    pub fn list_params(&self) -> ListParams {
        ListParams::new(1, self.page_size)
    }

    /// Pager showing `max_visible_pages` contiguous page buttons
    pub fn pager(&self, total_pages: usize) -> Pager {
        Pager::new(total_pages).with_max_visible(self.max_visible_pages)
    }

    /// Remote controller for `R` talking to `base_url`, bounded by `timeout_ms`
    pub fn remote_controller<R: Resource>(&self) -> ConsoleResult<RemoteController<R>> {
        let source = HttpDataSource::<R>::from_config(self)?;
        Ok(RemoteController::new(Arc::new(source)).with_timeout(self.timeout()))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            page_size: default_page_size(),
            max_visible_pages: default_max_visible_pages(),
        }
    }
}

/// Filters and search fields of one resource collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Collection name (e.g., "operators")
    pub name: String,

    #[serde(default)]
    pub search_fields: Vec<String>,

    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl ResourceConfig {
    /// Describe a resource with its built-in search fields
    pub fn for_resource<R: Resource>(filters: Vec<FilterSpec>) -> Self {
        Self {
            name: R::collection_name().to_string(),
            search_fields: R::search_fields().iter().map(|f| f.to_string()).collect(),
            filters,
        }
    }

    /// Filter engine evaluating this collection's filters and search fields
    pub fn engine(&self) -> FilterEngine {
        FilterEngine::new(self.filters.clone(), self.search_fields.clone())
    }
}

/// Complete console configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl ConsoleConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConsoleError::from)?;
        let config = Self::from_yaml_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConsoleError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another configuration into this one
    ///
    /// Server and remote settings of `other` win. A resource of `other` replaces
    /// the same-named resource of `self`; new resources are appended.
    pub fn merge(mut self, other: ConsoleConfig) -> Self {
        self.server = other.server;
        self.remote = other.remote;

        for resource in other.resources {
            match self.resources.iter_mut().find(|r| r.name == resource.name) {
                Some(existing) => *existing = resource,
                None => self.resources.push(resource),
            }
        }

        self
    }

    /// Merge configurations in order; later configurations win
    pub fn merge_all(configs: Vec<ConsoleConfig>) -> Self {
        configs
            .into_iter()
            .reduce(ConsoleConfig::merge)
            .unwrap_or_default()
    }

    /// Find the configuration of a collection
    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Check the configuration for values the console cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.timeout_ms == 0 {
            return Err(invalid("remote.timeout_ms", "0", "must be positive"));
        }
        if self.remote.page_size == 0 {
            return Err(invalid("remote.page_size", "0", "must be positive"));
        }
        if self.remote.max_visible_pages == 0 {
            return Err(invalid("remote.max_visible_pages", "0", "must be positive"));
        }

        let mut names = HashSet::new();
        for resource in &self.resources {
            if resource.name.trim().is_empty() {
                return Err(invalid("resources.name", &resource.name, "must not be empty"));
            }
            if !names.insert(resource.name.as_str()) {
                return Err(invalid("resources.name", &resource.name, "is declared twice"));
            }

            let mut filter_ids = HashSet::new();
            for spec in &resource.filters {
                let field = format!("resources.{}.filters", resource.name);
                if spec.id.trim().is_empty() {
                    return Err(invalid(&field, &spec.id, "filter id must not be empty"));
                }
                if !filter_ids.insert(spec.id.as_str()) {
                    return Err(invalid(&field, &spec.id, "filter id is not unique"));
                }

                let mut values = HashSet::new();
                for option in &spec.options {
                    if !values.insert(option.value.as_str()) {
                        return Err(invalid(
                            &format!("{field}.{}.options", spec.id),
                            &option.value,
                            "option value is not unique",
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Configuration describing the built-in console resources
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            remote: RemoteConfig::default(),
            resources: vec![
                ResourceConfig::for_resource::<Operator>(Operator::filter_specs()),
                ResourceConfig::for_resource::<Service>(Service::filter_specs()),
                ResourceConfig::for_resource::<Region>(Region::filter_specs()),
                ResourceConfig::for_resource::<Device>(Device::filter_specs()),
            ],
        }
    }
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_page_size() -> usize {
    20
}

fn default_max_visible_pages() -> usize {
    DEFAULT_MAX_VISIBLE
}
