//! Layout stage for Mermaid-style diagrams: structured diagram models in,
//! absolute geometry out.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod pipeline;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use error::{EngineError, LayoutError, PipelineError};
pub use ir::{DiagramKind, DiagramModel};
pub use layout::{Layout, compute_layout, compute_layout_with_engine};
pub use pipeline::{DiagramParser, DiagramRenderer, Pipeline};
pub use text_metrics::{DeterministicTextMeasurer, FontTextMeasurer, TextMeasurer};
