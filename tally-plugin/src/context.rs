//! Binding context: lifecycle state and an in-memory surface

use crate::{Surface, ToolMeta};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Initialization state embedded in every tool
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    initialized: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Check the surface for every required element and mark the tool bound
    pub fn bind(&mut self, meta: &ToolMeta, surface: &dyn Surface) -> bool {
        if self.initialized {
            return true;
        }

        let missing: Vec<&str> = meta.elements.iter()
            .copied()
            .filter(|id| !surface.has_element(id))
            .collect();
        if !missing.is_empty() {
            warn!(tool = meta.name, missing = ?missing, "required elements not found, tool left unbound");
            return false;
        }

        self.initialized = true;
        debug!(tool = meta.name, "initialized");
        true
    }

    /// Release the binding (used when the application context is disposed)
    pub fn reset(&mut self) {
        self.initialized = false;
    }
}

/// A surface that keeps element text in memory
///
/// Used by the stdio driver and by tests in place of a real UI.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: HashMap<String, String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that provides the given element ids, all empty
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut surface = Self::new();
        for id in ids {
            surface.add_element(id);
        }
        surface
    }

    /// Surface that satisfies every listed tool
    pub fn for_tools<'a>(metas: impl IntoIterator<Item = &'a ToolMeta>) -> Self {
        Self::with_elements(metas.into_iter().flat_map(|m| m.elements.iter().copied()))
    }

    pub fn add_element(&mut self, id: &str) {
        self.elements.entry(id.to_string()).or_default();
    }

    pub fn remove_element(&mut self, id: &str) {
        self.elements.remove(id);
    }

    /// Current text of every element, sorted by id
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.elements.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Surface for MemorySurface {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(slot) = self.elements.get_mut(id) {
            text.clone_into(slot);
        }
    }

    fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static META: ToolMeta = ToolMeta {
        name: "demo",
        description: "Demo tool",
        category: "utility",
        elements: &["demo-output", "demo-input"],
    };

    #[test]
    fn test_bind_requires_all_elements() {
        let surface = MemorySurface::with_elements(["demo-output"]);
        let mut lifecycle = Lifecycle::new();
        assert!(!lifecycle.bind(&META, &surface));
        assert!(!lifecycle.is_initialized());
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut surface = MemorySurface::for_tools([&META]);
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.bind(&META, &surface));
        // Removing an element afterwards does not unbind
        surface.remove_element("demo-input");
        assert!(lifecycle.bind(&META, &surface));
        lifecycle.reset();
        assert!(!lifecycle.bind(&META, &surface));
    }

    #[test]
    fn test_writes_to_unknown_elements_are_ignored() {
        let mut surface = MemorySurface::with_elements(["a"]);
        surface.set_text("a", "1");
        surface.set_text("b", "2");
        assert_eq!(surface.text("a"), Some("1"));
        assert_eq!(surface.text("b"), None);
        assert_eq!(surface.snapshot().len(), 1);
    }
}
