//! Parse, lay out and render a diagram source with pluggable stages.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::LayoutConfig;
use crate::error::{BoxError, LayoutError, PipelineError};
use crate::ir::{DiagramKind, DiagramModel};
use crate::layout::{GraphLayoutEngine, Layout, compute_layout_with_engine};
use crate::layout_dump::layout_dump_json;
use crate::text_metrics::{DeterministicTextMeasurer, TextMeasurer};

/// Turns diagram source text into a model. `Ok(None)` means the source
/// produced no diagram at all.
pub trait DiagramParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Option<DiagramModel>, BoxError>;
}

impl<F> DiagramParser for F
where
    F: Fn(&str) -> Result<Option<DiagramModel>, BoxError> + Send + Sync,
{
    fn parse(&self, source: &str) -> Result<Option<DiagramModel>, BoxError> {
        self(source)
    }
}

pub trait DiagramRenderer: Send + Sync {
    fn render(&self, layout: &Layout, config: &LayoutConfig) -> Result<String, BoxError>;
}

/// Reads a JSON-encoded [`DiagramModel`]. Blank input yields no model.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelParser;

impl DiagramParser for JsonModelParser {
    fn parse(&self, source: &str) -> Result<Option<DiagramModel>, BoxError> {
        if source.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(source)?))
    }
}

/// Emits the layout dump as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLayoutRenderer;

impl DiagramRenderer for JsonLayoutRenderer {
    fn render(&self, layout: &Layout, _config: &LayoutConfig) -> Result<String, BoxError> {
        Ok(layout_dump_json(layout)?)
    }
}

pub struct Pipeline {
    parsers: HashMap<DiagramKind, Box<dyn DiagramParser>>,
    renderers: HashMap<DiagramKind, Box<dyn DiagramRenderer>>,
    default_renderer: Option<Box<dyn DiagramRenderer>>,
    measurer: Arc<dyn TextMeasurer>,
    engine: Option<Arc<dyn GraphLayoutEngine>>,
    config: LayoutConfig,
}

impl Pipeline {
    pub fn new(config: LayoutConfig) -> Self {
        let measurer = DeterministicTextMeasurer {
            line_height: config.label_line_height,
        };
        Self {
            parsers: HashMap::new(),
            renderers: HashMap::new(),
            default_renderer: None,
            measurer: Arc::new(measurer),
            engine: None,
            config,
        }
    }

    /// A pipeline reading JSON models of every kind and writing layout dumps.
    pub fn json(config: LayoutConfig) -> Self {
        DiagramKind::ALL
            .into_iter()
            .fold(Self::new(config), |pipeline, kind| {
                pipeline.with_parser(kind, JsonModelParser)
            })
            .with_default_renderer(JsonLayoutRenderer)
    }

    pub fn with_parser(mut self, kind: DiagramKind, parser: impl DiagramParser + 'static) -> Self {
        self.parsers.insert(kind, Box::new(parser));
        self
    }

    pub fn with_renderer(
        mut self,
        kind: DiagramKind,
        renderer: impl DiagramRenderer + 'static,
    ) -> Self {
        self.renderers.insert(kind, Box::new(renderer));
        self
    }

    pub fn with_default_renderer(mut self, renderer: impl DiagramRenderer + 'static) -> Self {
        self.default_renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn GraphLayoutEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn measurer(&self) -> &Arc<dyn TextMeasurer> {
        &self.measurer
    }

    pub fn parse(&self, kind: DiagramKind, source: &str) -> Result<DiagramModel, PipelineError> {
        tracing::debug!(%kind, bytes = source.len(), "parsing diagram");
        let parser = self
            .parsers
            .get(&kind)
            .ok_or(PipelineError::MissingParser(kind))?;
        let model = parser
            .parse(source)
            .map_err(|source| PipelineError::Parse { kind, source })?
            .ok_or_else(|| LayoutError::invalid(kind, "parser produced no diagram"))?;
        if model.kind() != kind {
            return Err(PipelineError::KindMismatch {
                expected: kind,
                found: model.kind(),
            });
        }
        Ok(model)
    }

    pub fn layout(&self, model: &DiagramModel) -> Result<Layout, PipelineError> {
        tracing::debug!(kind = %model.kind(), "laying out diagram");
        let layout = compute_layout_with_engine(
            model,
            self.measurer.as_ref(),
            &self.config,
            self.engine.as_deref(),
        )?;
        Ok(layout)
    }

    pub fn render(&self, layout: &Layout) -> Result<String, PipelineError> {
        let kind = layout.kind;
        tracing::debug!(%kind, "rendering layout");
        let renderer = self
            .renderers
            .get(&kind)
            .or(self.default_renderer.as_ref())
            .ok_or(PipelineError::MissingRenderer(kind))?;
        renderer
            .render(layout, &self.config)
            .map_err(|source| PipelineError::Render { kind, source })
    }

    /// Runs every stage for one diagram source.
    pub fn run(&self, kind: DiagramKind, source: &str) -> Result<String, PipelineError> {
        let model = self.parse(kind, source)?;
        let layout = self.layout(&model)?;
        let output = self.render(&layout)?;
        tracing::debug!(%kind, bytes = output.len(), "pipeline finished");
        Ok(output)
    }
}
