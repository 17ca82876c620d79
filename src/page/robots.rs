//! Per-page robots policy.

use serde::{Deserialize, Serialize};

/// Whether search engine robots may index a page.
///
/// `Inherit` defers to the parent pages; a root page that inherits allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsPolicy {
    Allow,
    Disallow,
    #[default]
    Inherit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        #[derive(Deserialize)]
        struct Doc {
            robots: RobotsPolicy,
        }
        let doc: Doc = toml::from_str("robots = \"disallow\"").unwrap();
        assert_eq!(doc.robots, RobotsPolicy::Disallow);
        assert!(toml::from_str::<Doc>("robots = \"maybe\"").is_err());
    }
}
