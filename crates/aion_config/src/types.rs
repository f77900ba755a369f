//! Configuration types deserialized from `aion.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Default bound on the number of iterations a single generate loop may run.
pub const DEFAULT_MAX_GENERATE_ITERATIONS: u32 = 65536;

/// The elaboration settings parsed from `aion.toml`.
///
/// Every section is optional; `ElabConfig::default()` is what an empty file
/// parses to.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ElabConfig {
    /// Which modules become design roots.
    #[serde(default)]
    pub design: DesignConfig,
    /// Elaboration switches.
    #[serde(default)]
    pub elaborate: ElaborateConfig,
    /// Free-form design flags, readable through the elaborated design.
    #[serde(default)]
    pub flags: BTreeMap<String, String>,
}

/// Root module selection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DesignConfig {
    /// Root module names, in order.
    ///
    /// Accepts a single string or a list. When empty, every module that is
    /// never instantiated by another module becomes a root.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub top: Vec<String>,
}

/// Switches controlling the elaboration passes.
#[derive(Debug, Clone, Deserialize)]
pub struct ElaborateConfig {
    /// Emit `log::debug!` traces for scope creation and parameter replacement.
    #[serde(default)]
    pub debug_scopes: bool,
    /// Emit `log::debug!` traces for generate loops and expression elaboration.
    #[serde(default)]
    pub debug_elaborate: bool,
    /// Upper bound on iterations of one generate loop; must be positive.
    #[serde(default = "default_max_generate_iterations")]
    pub max_generate_iterations: u32,
}

impl Default for ElaborateConfig {
    fn default() -> Self {
        Self {
            debug_scopes: false,
            debug_elaborate: false,
            max_generate_iterations: DEFAULT_MAX_GENERATE_ITERATIONS,
        }
    }
}

fn default_max_generate_iterations() -> u32 {
    DEFAULT_MAX_GENERATE_ITERATIONS
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `top = "cpu"` as shorthand for `top = ["cpu"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn top_accepts_string() {
        let config = load_config_from_str("[design]\ntop = \"cpu\"\n").unwrap();
        assert_eq!(config.design.top, vec!["cpu".to_string()]);
    }

    #[test]
    fn top_accepts_list() {
        let config = load_config_from_str("[design]\ntop = [\"cpu\", \"tb\"]\n").unwrap();
        assert_eq!(config.design.top, vec!["cpu".to_string(), "tb".to_string()]);
    }

    #[test]
    fn elaborate_defaults() {
        let config = ElabConfig::default();
        assert!(!config.elaborate.debug_scopes);
        assert!(!config.elaborate.debug_elaborate);
        assert_eq!(
            config.elaborate.max_generate_iterations,
            DEFAULT_MAX_GENERATE_ITERATIONS
        );
        assert!(config.flags.is_empty());
    }

    #[test]
    fn partial_elaborate_section_fills_defaults() {
        let config = load_config_from_str("[elaborate]\ndebug_scopes = true\n").unwrap();
        assert!(config.elaborate.debug_scopes);
        assert_eq!(
            config.elaborate.max_generate_iterations,
            DEFAULT_MAX_GENERATE_ITERATIONS
        );
    }
}
