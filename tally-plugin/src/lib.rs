//! Tally Plugin System
//!
//! Provides the contract between tools and the presentation shell:
//! - `Tool`: a calculator or converter with an idempotent `init`
//! - `Surface`: the shell's named display elements
//! - `ToolRegistry`: the directory of modes used for navigation

mod traits;
mod registry;
mod context;

pub use traits::{Tool, ToolMeta, Surface};
pub use registry::{ToolRegistry, ToolSummary};
pub use context::{Lifecycle, MemorySurface};

/// Re-export core types for tool authors
pub mod prelude {
    pub use crate::{Tool, ToolMeta, Surface, Lifecycle, MemorySurface, ToolRegistry};
    pub use tally_core::prelude::*;
}
