use crate::sim::{QuestStatus, Vec2};

use super::metrics::LoopMetricsSnapshot;
use super::rendering::raster::{fill_rect, outline_rect, ScreenRect};
use super::rendering::text::{draw_text, line_advance, text_width};

const TEXT_SCALE: i32 = 2;
const PADDING: i32 = 6 * TEXT_SCALE;
const INSET: i32 = 3 * TEXT_SCALE;
const TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const LABEL_COLOR: [u8; 4] = [176, 198, 220, 255];
const PANEL_COLOR: [u8; 4] = [10, 12, 16, 210];
const BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];

/// Everything the F3 debug panel shows for one frame.
#[derive(Debug, Clone)]
pub(crate) struct OverlayData<'a> {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub map_id: &'a str,
    pub hero_position: Vec2,
    pub zoom: f32,
    pub talking: bool,
    pub active_quest: Option<(&'a str, QuestStatus)>,
    pub ticks: u64,
}

pub(crate) fn draw_overlay(frame: &mut [u8], width: u32, height: u32, data: &OverlayData<'_>) {
    if width == 0 || height == 0 {
        return;
    }
    let lines = overlay_lines(data);
    let widest = lines
        .iter()
        .map(|(_, line)| text_width(line, TEXT_SCALE))
        .max()
        .unwrap_or(0);
    let panel = ScreenRect::new(
        PADDING - INSET,
        PADDING - INSET,
        widest + INSET * 2,
        lines.len() as i32 * line_advance(TEXT_SCALE) + INSET * 2,
    );
    fill_rect(frame, width, height, panel, PANEL_COLOR);
    outline_rect(frame, width, height, panel, BORDER_COLOR);

    let mut y = PADDING;
    for (is_label, line) in &lines {
        let color = if *is_label { LABEL_COLOR } else { TEXT_COLOR };
        draw_text(frame, width, height, PADDING, y, line, color, TEXT_SCALE);
        y += line_advance(TEXT_SCALE);
    }
}

/// `(is_section_label, text)` pairs, top to bottom.
fn overlay_lines(data: &OverlayData<'_>) -> Vec<(bool, String)> {
    let cap = data
        .render_fps_cap
        .map_or_else(|| "off".to_string(), |cap| cap.to_string());
    let quest = match data.active_quest {
        Some((id, status)) => format!("quest: {id} ({})", status.as_token()),
        None => "quest: none".to_string(),
    };
    vec![
        (true, "loop".to_string()),
        (false, format!("fps: {:.0} cap {cap}", data.metrics.fps)),
        (false, format!("tps: {:.1}", data.metrics.tps)),
        (
            false,
            format!(
                "frame: {:.2} ms max {:.2}",
                data.metrics.frame_time_ms, data.metrics.worst_frame_ms
            ),
        ),
        (false, format!("tick: {}", data.ticks)),
        (true, "world".to_string()),
        (false, format!("map: {}", data.map_id)),
        (
            false,
            format!(
                "hero: {:.1},{:.1}",
                data.hero_position.x, data.hero_position.y
            ),
        ),
        (false, format!("zoom: {:.2}", data.zoom)),
        (false, format!("talking: {}", if data.talking { "yes" } else { "no" })),
        (false, quest),
    ]
}
