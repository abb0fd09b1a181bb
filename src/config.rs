use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every tunable constant of the layout stage. All keys are optional in
/// config files; missing keys keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub font_size: f32,
    pub label_line_height: f32,
    pub max_label_width_chars: usize,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    pub canvas: CanvasConfig,
    pub graph: GraphConfig,
    pub mindmap: MindmapConfig,
    pub gantt: GanttConfig,
    pub radar: RadarConfig,
    pub pie: PieConfig,
    pub quadrant: QuadrantConfig,
    pub sankey: SankeyConfig,
    pub timeline: TimelineConfig,
    pub block: BlockConfig,
    pub kanban: KanbanConfig,
    pub packet: PacketConfig,
    pub error: ErrorConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            label_line_height: 1.5,
            max_label_width_chars: 22,
            node_padding_x: 30.0,
            node_padding_y: 15.0,
            canvas: CanvasConfig::default(),
            graph: GraphConfig::default(),
            mindmap: MindmapConfig::default(),
            gantt: GanttConfig::default(),
            radar: RadarConfig::default(),
            pie: PieConfig::default(),
            quadrant: QuadrantConfig::default(),
            sankey: SankeyConfig::default(),
            timeline: TimelineConfig::default(),
            block: BlockConfig::default(),
            kanban: KanbanConfig::default(),
            packet: PacketConfig::default(),
            error: ErrorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub padding: f32,
    pub min_width: f32,
    pub min_height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            min_width: 800.0,
            min_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub grid_columns: usize,
    pub container_padding: f32,
    pub container_label_height: f32,
    pub class_row_height: f32,
    pub class_divider_padding: f32,
    pub entity_row_height: f32,
    pub state_marker_size: f32,
    pub fork_bar_length: f32,
    pub fork_bar_thickness: f32,
    pub participant_min_width: f32,
    pub participant_height: f32,
    pub actor_width: f32,
    pub actor_height: f32,
    pub c4_min_width: f32,
    pub c4_min_height: f32,
    pub requirement_min_width: f32,
    pub service_icon_size: f32,
    pub journey_task_width: f32,
    pub journey_task_height: f32,
    pub treemap_min_size: f32,
    pub title_gap: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            node_spacing: 50.0,
            rank_spacing: 50.0,
            grid_columns: 3,
            container_padding: 20.0,
            container_label_height: 24.0,
            class_row_height: 24.0,
            class_divider_padding: 8.0,
            entity_row_height: 28.0,
            state_marker_size: 14.0,
            fork_bar_length: 70.0,
            fork_bar_thickness: 10.0,
            participant_min_width: 150.0,
            participant_height: 65.0,
            actor_width: 80.0,
            actor_height: 80.0,
            c4_min_width: 216.0,
            c4_min_height: 60.0,
            requirement_min_width: 200.0,
            service_icon_size: 80.0,
            journey_task_width: 150.0,
            journey_task_height: 50.0,
            treemap_min_size: 60.0,
            title_gap: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MindmapConfig {
    pub per_char_width: f32,
    pub margin: f32,
    pub min_width: f32,
    pub node_height: f32,
    pub sibling_spacing: f32,
    pub level_spacing: f32,
    pub top_padding: f32,
    pub hexagon_extra_width: f32,
}

impl Default for MindmapConfig {
    fn default() -> Self {
        Self {
            per_char_width: 8.0,
            margin: 40.0,
            min_width: 80.0,
            node_height: 40.0,
            sibling_spacing: 30.0,
            level_spacing: 100.0,
            top_padding: 50.0,
            hexagon_extra_width: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GanttConfig {
    pub max_resolution_rounds: usize,
    pub timeline_width: f32,
    pub bar_height: f32,
    pub bar_gap: f32,
    pub top_padding: f32,
    pub title_height: f32,
    pub section_label_width: f32,
    pub milestone_width: f32,
    pub tick_count: usize,
    pub tick_format: String,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            max_resolution_rounds: 100,
            timeline_width: 800.0,
            bar_height: 20.0,
            bar_gap: 4.0,
            top_padding: 50.0,
            title_height: 30.0,
            section_label_width: 150.0,
            milestone_width: 10.0,
            tick_count: 5,
            tick_format: "%Y-%m-%d".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadarConfig {
    pub radius: f32,
    pub ticks: usize,
    pub axis_label_offset: f32,
    pub title_gap: f32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            radius: 250.0,
            ticks: 5,
            axis_label_offset: 20.0,
            title_gap: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PieConfig {
    pub radius: f32,
    pub text_position: f32,
    pub min_label_percent: f32,
    pub legend_rect_size: f32,
    pub legend_spacing: f32,
    pub legend_gap: f32,
    pub title_gap: f32,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            radius: 185.0,
            text_position: 0.75,
            min_label_percent: 1.0,
            legend_rect_size: 18.0,
            legend_spacing: 4.0,
            legend_gap: 40.0,
            title_gap: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuadrantConfig {
    pub grid_size: f32,
    pub point_radius: f32,
    pub axis_label_gap: f32,
    pub title_gap: f32,
}

impl Default for QuadrantConfig {
    fn default() -> Self {
        Self {
            grid_size: 500.0,
            point_radius: 5.0,
            axis_label_gap: 20.0,
            title_gap: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SankeyConfig {
    pub width: f32,
    pub height: f32,
    pub node_width: f32,
    pub node_gap: f32,
}

impl Default for SankeyConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            node_width: 10.0,
            node_gap: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    pub axis_width: f32,
    pub event_width: f32,
    pub event_gap: f32,
    pub axis_gap: f32,
    pub section_height: f32,
    pub title_gap: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            axis_width: 800.0,
            event_width: 150.0,
            event_gap: 10.0,
            axis_gap: 30.0,
            section_height: 30.0,
            title_gap: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockConfig {
    pub default_columns: usize,
    pub cell_min_width: f32,
    pub cell_min_height: f32,
    pub gap: f32,
    pub padding: f32,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            default_columns: 3,
            cell_min_width: 80.0,
            cell_min_height: 40.0,
            gap: 10.0,
            padding: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KanbanConfig {
    pub column_width: f32,
    pub column_gap: f32,
    pub column_padding: f32,
    pub header_height: f32,
    pub card_base_height: f32,
    pub metadata_line_height: f32,
    pub card_gap: f32,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            column_width: 200.0,
            column_gap: 10.0,
            column_padding: 10.0,
            header_height: 40.0,
            card_base_height: 44.0,
            metadata_line_height: 18.0,
            card_gap: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PacketConfig {
    pub bits_per_row: u32,
    pub bit_width: f32,
    pub row_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub show_bits: bool,
    pub title_gap: f32,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            bits_per_row: 32,
            bit_width: 32.0,
            row_height: 32.0,
            padding_x: 5.0,
            padding_y: 5.0,
            show_bits: true,
            title_gap: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorConfig {
    pub message: String,
    pub version: String,
    pub viewbox_width: f32,
    pub viewbox_height: f32,
    pub render_width: f32,
    pub render_height: Option<f32>,
    pub text_x: f32,
    pub text_y: f32,
    pub text_size: f32,
    pub version_x: f32,
    pub version_y: f32,
    pub version_size: f32,
    pub icon_scale: f32,
    pub icon_tx: f32,
    pub icon_ty: f32,
    pub info_width: f32,
    pub info_height: f32,
    pub info_font_size: f32,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            message: "Syntax error in text".to_string(),
            version: "11.12.2".to_string(),
            viewbox_width: 2412.0,
            viewbox_height: 512.0,
            render_width: 512.0,
            render_height: None,
            text_x: 1440.0,
            text_y: 250.0,
            text_size: 150.0,
            version_x: 1250.0,
            version_y: 400.0,
            version_size: 100.0,
            icon_scale: 1.0,
            icon_tx: 0.0,
            icon_ty: 0.0,
            info_width: 400.0,
            info_height: 100.0,
            info_font_size: 32.0,
        }
    }
}

/// Loads a layout config from a JSON or JSON5 file. `None` yields defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: LayoutConfig = json5::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded layout config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let config: LayoutConfig =
            json5::from_str("{ mindmap: { levelSpacing: 120 }, canvas: { padding: 10 } }").unwrap();
        assert_eq!(config.mindmap.level_spacing, 120.0);
        assert_eq!(config.mindmap.sibling_spacing, 30.0);
        assert_eq!(config.canvas.padding, 10.0);
        assert_eq!(config.canvas.min_width, 800.0);
        assert_eq!(config.gantt.max_resolution_rounds, 100);
    }

    #[test]
    fn load_config_without_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.packet.bits_per_row, 32);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/layout.json5"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
