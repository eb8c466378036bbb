use std::collections::BTreeSet;

/// Prop types the batcher is allowed to consolidate. Anything else is left to
/// individual rendering.
pub const DEFAULT_BATCHED_TYPES: &[&str] = &[
    "sidewalk",
    "pineTree",
    "oakTree",
    "modern_tower",
    "house_modern",
    "house_cottage",
    "constructionBarrier",
    "streetLight",
];

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub supported_types: BTreeSet<String>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Batches span the whole map, so culling them against the template's
    /// original bounds would hide instances that are actually on screen.
    pub frustum_culled: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            supported_types: DEFAULT_BATCHED_TYPES
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            cast_shadows: true,
            receive_shadows: true,
            frustum_culled: false,
        }
    }
}

impl BatchConfig {
    pub fn with_supported_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_supported(&self, type_tag: &str) -> bool {
        self.supported_types.contains(type_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allowlist_contains_trees_but_not_lamps() {
        let config = BatchConfig::default();
        assert!(config.is_supported("pineTree"));
        assert!(config.is_supported("sidewalk"));
        assert!(!config.is_supported("lamp"));
        assert!(!config.frustum_culled);
    }

    #[test]
    fn allowlist_can_be_replaced() {
        let config = BatchConfig::default().with_supported_types(["lamp"]);
        assert!(config.is_supported("lamp"));
        assert!(!config.is_supported("pineTree"));
    }
}
