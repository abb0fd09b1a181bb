use crate::ir::DiagramKind;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid {kind} diagram: {reason}")]
    InvalidDiagram { kind: DiagramKind, reason: String },
}

impl LayoutError {
    pub fn invalid(kind: DiagramKind, reason: impl Into<String>) -> Self {
        Self::InvalidDiagram {
            kind,
            reason: reason.into(),
        }
    }
}

/// Failure reported by an external graph layout engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("graph layout engine unavailable")]
    Unavailable,
    #[error("graph layout engine failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no parser registered for {0} diagrams")]
    MissingParser(DiagramKind),
    #[error("no renderer registered for {0} diagrams")]
    MissingRenderer(DiagramKind),
    #[error("failed to parse {kind} diagram: {source}")]
    Parse {
        kind: DiagramKind,
        #[source]
        source: BoxError,
    },
    #[error("parser for {expected} diagrams produced a {found} model")]
    KindMismatch {
        expected: DiagramKind,
        found: DiagramKind,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to render {kind} diagram: {source}")]
    Render {
        kind: DiagramKind,
        #[source]
        source: BoxError,
    },
}
