use crate::config::LayoutConfig;
use crate::ir::{ErrorModel, InfoModel};

use super::{DiagramData, ErrorLayout, InfoLayout, LayoutParts};

pub(super) fn compute_error_layout(model: &ErrorModel, config: &LayoutConfig) -> LayoutParts {
    let error = &config.error;
    let viewbox_width = error.viewbox_width.max(1.0);
    let viewbox_height = error.viewbox_height.max(1.0);
    let width = error.render_width.max(1.0);
    let height = error
        .render_height
        .unwrap_or_else(|| (width * viewbox_height / viewbox_width).round())
        .max(1.0);
    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Error(ErrorLayout {
            viewbox_width,
            viewbox_height,
            width,
            height,
            message: model
                .message
                .clone()
                .unwrap_or_else(|| error.message.clone()),
            version: error.version.clone(),
            text_x: error.text_x,
            text_y: error.text_y,
            text_size: error.text_size,
            version_x: error.version_x,
            version_y: error.version_y,
            version_size: error.version_size,
            icon_scale: error.icon_scale,
            icon_tx: error.icon_tx,
            icon_ty: error.icon_ty,
        }),
    }
}

pub(super) fn compute_info_layout(model: &InfoModel, config: &LayoutConfig) -> LayoutParts {
    let error = &config.error;
    let font_size = error.info_font_size;
    LayoutParts {
        nodes: Vec::new(),
        edges: Vec::new(),
        diagram: DiagramData::Info(InfoLayout {
            version: model
                .version
                .clone()
                .unwrap_or_else(|| format!("v{}", error.version)),
            width: error.info_width,
            height: error.info_height,
            text_x: error.info_width / 2.0,
            text_y: (error.info_height + font_size) / 2.0,
            font_size,
        }),
    }
}
