//! Tool traits

use serde::Serialize;

/// Metadata for a tool (one calculator or converter mode)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMeta {
    /// Mode name used for navigation (e.g. "standard", "length-converter")
    pub name: &'static str,
    pub description: &'static str,
    /// "calculator", "converter" or "utility"
    pub category: &'static str,
    /// Display elements the tool needs before it can bind
    pub elements: &'static [&'static str],
}

/// The presentation shell as seen by a tool
///
/// Elements are addressed by id. A shell that lacks an element a tool
/// requires makes that tool's `init` fail; writing to an unknown element
/// is ignored.
pub trait Surface {
    fn has_element(&self, id: &str) -> bool;
    fn set_text(&mut self, id: &str, text: &str);
    fn text(&self, id: &str) -> Option<&str>;
}

/// A calculator or converter driven by the shell
pub trait Tool {
    fn meta(&self) -> ToolMeta;

    fn is_initialized(&self) -> bool;

    /// Bind to the shell. Idempotent: returns `true` immediately once
    /// initialized, `false` (after logging) when required elements are
    /// missing, leaving the tool unbound.
    fn init(&mut self, surface: &dyn Surface) -> bool;

    /// Push current state into the bound elements. Callers invoke this
    /// explicitly after each mutation.
    fn update_display(&self, surface: &mut dyn Surface);
}
