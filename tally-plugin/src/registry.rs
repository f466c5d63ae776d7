//! Tool Registry

use crate::ToolMeta;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tally_core::TallyError;

/// Directory of every tool the application offers, keyed by mode name
pub struct ToolRegistry {
    tools: HashMap<String, ToolMeta>,
}

/// One entry of `ToolRegistry::list`
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub category: String,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn with_tool(mut self, meta: ToolMeta) -> Self {
        self.tools.insert(meta.name.to_lowercase(), meta);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolMeta> {
        self.tools.get(&name.to_lowercase())
    }

    /// Resolve a navigation target to a registered mode name
    ///
    /// Accepts the exact name, the bare name with a `-calculator` or
    /// `-converter` suffix added, or a suffixed name whose bare form is
    /// registered ("length" -> "length-converter", "standard-calculator"
    /// -> "standard").
    pub fn resolve(&self, name: &str) -> Result<&ToolMeta, TallyError> {
        let name = name.trim().to_lowercase();
        let candidates = [
            name.clone(),
            format!("{}-calculator", name),
            format!("{}-converter", name),
            name.trim_end_matches("-converter").to_string(),
            name.trim_end_matches("-calculator").to_string(),
        ];

        for candidate in &candidates {
            if let Some(meta) = self.tools.get(candidate) {
                return Ok(meta);
            }
        }

        let similar = self.find_similar(&name);
        let mut err = TallyError::unknown_mode(&name);
        if !similar.is_empty() {
            let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
            err = err.with_suggestion(format!(
                "Similar: {}. Use 'list' for all modes.",
                suggestions.join(", ")
            ));
        }
        Err(err)
    }

    /// Mode names similar to the given name (for error suggestions)
    fn find_similar(&self, name: &str) -> Vec<String> {
        let mut matches: Vec<(String, usize)> = self.tools.keys()
            .filter_map(|tool_name| {
                let score = Self::similarity_score(name, tool_name);
                if score > 0 {
                    Some((tool_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Sort by similarity score (higher = more similar), then name for stable output
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Similarity score between two strings
    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        // Exact prefix match is best
        if candidate.starts_with(query) {
            score += 100;
        }
        // Contains the query
        else if candidate.contains(query) {
            score += 50;
        }
        // Query contains the candidate
        else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: std::collections::HashSet<char> = query.chars().collect();
        let candidate_chars: std::collections::HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        // Ignore incidental overlap on very short queries
        if common >= 3 {
            score += common * 2;
        }

        score
    }

    /// All tools, optionally filtered by category, sorted by name
    pub fn list(&self, category: Option<&str>) -> Vec<ToolSummary> {
        let mut out: Vec<ToolSummary> = self.tools.values()
            .filter(|m| category.map_or(true, |c| m.category == c))
            .map(|m| ToolSummary {
                name: m.name.to_string(),
                description: m.description.to_string(),
                category: m.category.to_string(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Tool names grouped by category
    pub fn by_category(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for meta in self.tools.values() {
            grouped.entry(meta.category.to_string()).or_default().push(meta.name.to_string());
        }
        for names in grouped.values_mut() {
            names.sort();
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::codes;

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with_tool(ToolMeta { name: "standard", description: "Standard", category: "calculator", elements: &[] })
            .with_tool(ToolMeta { name: "scientific", description: "Scientific", category: "calculator", elements: &[] })
            .with_tool(ToolMeta { name: "length-converter", description: "Length", category: "converter", elements: &[] })
    }

    #[test]
    fn test_resolve_exact_and_suffixed() {
        let reg = registry();
        assert_eq!(reg.resolve("standard").unwrap().name, "standard");
        assert_eq!(reg.resolve("Standard-Calculator").unwrap().name, "standard");
        assert_eq!(reg.resolve("length").unwrap().name, "length-converter");
        assert_eq!(reg.resolve("length-converter").unwrap().name, "length-converter");
    }

    #[test]
    fn test_resolve_unknown_suggests_similar() {
        let reg = registry();
        let err = reg.resolve("sci").unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_MODE);
        assert!(err.suggestion.unwrap().contains("scientific"));
    }

    #[test]
    fn test_list_by_category() {
        let reg = registry();
        assert_eq!(reg.list(Some("calculator")).len(), 2);
        assert_eq!(reg.list(None).len(), 3);
        let grouped = reg.by_category();
        assert_eq!(grouped["converter"], vec!["length-converter".to_string()]);
    }
}
