use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_XML_DEPTH: usize = 256;

/// Element levels a filter needs beyond its own nesting: the enclosing
/// `Filter` plus up to two levels below the innermost predicate, as in
/// `gml:Box/gml:coordinates` or `LowerBoundary/Literal`.
pub const XML_DEPTH_HEADROOM: usize = 3;

/// Limits applied while reading and building a filter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Deepest filter tree the builder accepts, counting the root as 1.
    pub max_depth: usize,
    /// Deepest raw element nesting the XML reader accepts.
    pub max_xml_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_xml_depth: DEFAULT_MAX_XML_DEPTH,
        }
    }
}

impl CompilerConfig {
    /// Defaults, then the optional file (YAML, TOML or JSON by extension),
    /// then `OGCFILTER_*` environment variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let settings = builder
            .add_source(::config::Environment::with_prefix("OGCFILTER").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// XML nesting needed to read a filter that is `max_depth` levels deep.
    pub fn required_xml_depth(&self) -> usize {
        self.max_depth.saturating_add(XML_DEPTH_HEADROOM)
    }

    /// Set the filter depth limit, raising the XML limit to match if needed.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self.max_xml_depth = self.max_xml_depth.max(self.required_xml_depth());
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_depth == 0 {
            anyhow::bail!("Config: max_depth must be at least 1");
        }
        if self.max_xml_depth < self.required_xml_depth() {
            anyhow::bail!(
                "Config: max_xml_depth ({}) must be at least max_depth + {} ({})",
                self.max_xml_depth,
                XML_DEPTH_HEADROOM,
                self.required_xml_depth()
            );
        }
        Ok(())
    }
}
