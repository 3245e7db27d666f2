//! Comment categories and their display registry.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{GENERAL_COLOR, GENERAL_LABEL};

/// Fixed classification of a comment's intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentCategory {
    #[default]
    General,
    Praise,
    Correction,
    Suggestion,
    Question,
}

impl CommentCategory {
    pub const ALL: [CommentCategory; 5] = [
        CommentCategory::General,
        CommentCategory::Praise,
        CommentCategory::Correction,
        CommentCategory::Suggestion,
        CommentCategory::Question,
    ];

    /// Wire key, e.g. `"praise"`.
    pub fn key(self) -> &'static str {
        match self {
            CommentCategory::General => "general",
            CommentCategory::Praise => "praise",
            CommentCategory::Correction => "correction",
            CommentCategory::Suggestion => "suggestion",
            CommentCategory::Question => "question",
        }
    }

    /// Exact key lookup.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Lookup that treats anything unrecognized as `General`.
    pub fn from_key(key: &str) -> Self {
        Self::parse(key.trim()).unwrap_or_default()
    }

    fn builtin(self) -> CategoryInfo {
        let (label, color) = match self {
            CommentCategory::General => (GENERAL_LABEL, GENERAL_COLOR),
            CommentCategory::Praise => ("Praise", "#28a745"),
            CommentCategory::Correction => ("Correction", "#dc3545"),
            CommentCategory::Suggestion => ("Suggestion", "#0d6efd"),
            CommentCategory::Question => ("Question", "#6f42c1"),
        };
        CategoryInfo {
            label: label.to_string(),
            color: color.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for CommentCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(CommentCategory::from_key).unwrap_or_default())
    }
}

/// Label and color for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub label: String,
    pub color: String,
}

/// Category presentation supplied once at initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRegistry {
    entries: Vec<(CommentCategory, CategoryInfo)>,
}

impl CategoryRegistry {
    /// Builds a registry from host-supplied definitions keyed by category key.
    ///
    /// Keys outside the fixed set are ignored.
    pub fn from_definitions(definitions: &HashMap<String, CategoryInfo>) -> Self {
        for key in definitions.keys() {
            if CommentCategory::parse(key).is_none() {
                tracing::debug!(key = %key, "ignoring unknown category definition");
            }
        }
        let entries = CommentCategory::ALL
            .into_iter()
            .filter_map(|category| {
                definitions
                    .get(category.key())
                    .map(|info| (category, info.clone()))
            })
            .collect();
        Self { entries }
    }

    /// Registry populated with the stock labels and colors.
    pub fn builtin() -> Self {
        Self {
            entries: CommentCategory::ALL
                .into_iter()
                .map(|category| (category, category.builtin()))
                .collect(),
        }
    }

    /// Presentation for a category, falling back to "general", then to the stock general entry.
    pub fn info(&self, category: CommentCategory) -> CategoryInfo {
        self.lookup(category)
            .or_else(|| self.lookup(CommentCategory::General))
            .cloned()
            .unwrap_or_else(|| CommentCategory::General.builtin())
    }

    /// Presentation for a raw key; unknown keys resolve to "general".
    pub fn info_for_key(&self, key: &str) -> CategoryInfo {
        self.info(CommentCategory::from_key(key))
    }

    /// Defined categories in fixed order, used for filter pills and pickers.
    pub fn entries(&self) -> &[(CommentCategory, CategoryInfo)] {
        &self.entries
    }

    fn lookup(&self, category: CommentCategory) -> Option<&CategoryInfo> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == category)
            .map(|(_, info)| info)
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_falls_back_to_general() {
        assert_eq!(CommentCategory::from_key("praise"), CommentCategory::Praise);
        assert_eq!(CommentCategory::from_key("rant"), CommentCategory::General);
        assert_eq!(CommentCategory::from_key(""), CommentCategory::General);
    }

    #[test]
    fn test_deserialize_tolerates_missing_and_unknown() {
        let parsed: Vec<CommentCategory> =
            serde_json::from_str(r#"["question", "nonsense", null]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                CommentCategory::Question,
                CommentCategory::General,
                CommentCategory::General
            ]
        );
    }

    #[test]
    fn test_registry_falls_back_to_general_entry() {
        let mut definitions = HashMap::new();
        definitions.insert(
            "general".to_string(),
            CategoryInfo {
                label: "Note".to_string(),
                color: "#111111".to_string(),
            },
        );
        definitions.insert(
            "bogus".to_string(),
            CategoryInfo {
                label: "Bogus".to_string(),
                color: "#222222".to_string(),
            },
        );
        let registry = CategoryRegistry::from_definitions(&definitions);
        assert_eq!(registry.entries().len(), 1);
        assert_eq!(registry.info(CommentCategory::Praise).label, "Note");
        assert_eq!(registry.info_for_key("bogus").color, "#111111");
    }

    #[test]
    fn test_empty_registry_uses_stock_general() {
        let registry = CategoryRegistry::from_definitions(&HashMap::new());
        let info = registry.info(CommentCategory::Question);
        assert_eq!(info.label, GENERAL_LABEL);
        assert_eq!(info.color, GENERAL_COLOR);
    }
}
