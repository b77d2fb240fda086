//! Build configuration for the offline quadtree builder.
use crate::quadtree::MAX_TREE_DEPTH;
use geomoir_types::Bound;
use serde::de::Error;

/// How the builder decides that a cell is settled before `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafPolicy {
    /// A cell becomes a leaf as soon as at most one country intersects it,
    /// tangency included. This is the canonical policy of the tree files.
    #[default]
    Intersecting,
    /// Only countries with a positive overlap are considered, and a single
    /// country settles a cell only when it covers all of it. Partially
    /// covered cells keep splitting until `max_depth`.
    Covering,
}

/// Configuration of a quadtree build.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Depth at which a contested cell is resolved by largest overlap
    #[serde(default = "BuildConfig::default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub leaf_policy: LeafPolicy,

    /// GeoJSON feature property holding the country name
    #[serde(default = "BuildConfig::default_name_property")]
    pub name_property: String,

    /// Root bound override; the envelope of all countries is used when unset
    #[serde(default)]
    pub bound: Option<Bound>,
}

impl BuildConfig {
    const fn default_max_depth() -> usize {
        9
    }

    fn default_name_property() -> String {
        "name".to_string()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        assert!(
            max_depth <= MAX_TREE_DEPTH,
            "Max depth must not exceed {}",
            MAX_TREE_DEPTH
        );
        self.max_depth = max_depth;
        self
    }

    pub fn with_leaf_policy(mut self, policy: LeafPolicy) -> Self {
        self.leaf_policy = policy;
        self
    }

    pub fn with_name_property(mut self, property: impl Into<String>) -> Self {
        self.name_property = property.into();
        self
    }

    pub fn with_bound(mut self, bound: Bound) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(format!(
                "Max depth {} exceeds the limit of {}",
                self.max_depth, MAX_TREE_DEPTH
            ));
        }

        if self.name_property.is_empty() {
            return Err("Name property must not be empty".to_string());
        }

        if let Some(bound) = &self.bound
            && !bound.is_valid()
        {
            return Err(format!("Root bound {} is not a valid rectangle", bound));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: BuildConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: BuildConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
            leaf_policy: LeafPolicy::default(),
            name_property: Self::default_name_property(),
            bound: None,
        }
    }
}
