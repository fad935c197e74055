use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::overlay::{draw_overlay, OverlayData};
use crate::sim::{DialogView, EntityRole, Rect, RenderState};

use super::raster::{clear, fill_rect, outline_rect, ScreenRect};
use super::text::{draw_text, glyph_advance, line_advance, wrap_text};
use super::transform::{rect_to_screen, Camera, Viewport};

const VOID_COLOR: [u8; 4] = [14, 16, 22, 255];
const GROUND_COLOR: [u8; 4] = [52, 78, 48, 255];
const WALL_COLOR: [u8; 4] = [104, 92, 80, 255];
const WALL_EDGE_COLOR: [u8; 4] = [64, 56, 48, 255];
const EXIT_COLOR: [u8; 4] = [70, 140, 220, 150];
const ZONE_COLOR: [u8; 4] = [220, 196, 96, 255];
const ITEM_COLOR: [u8; 4] = [250, 214, 64, 255];
const HERO_COLOR: [u8; 4] = [226, 230, 240, 255];
const NPC_COLOR: [u8; 4] = [204, 124, 92, 255];
const PARTNER_OUTLINE_COLOR: [u8; 4] = [255, 244, 150, 255];
const FEET_COLOR: [u8; 4] = [24, 24, 28, 255];
const BUBBLE_COLOR: [u8; 4] = [248, 246, 236, 235];
const BUBBLE_BORDER_COLOR: [u8; 4] = [40, 40, 48, 255];
const BUBBLE_SPEAKER_COLOR: [u8; 4] = [120, 60, 40, 255];
const BUBBLE_TEXT_COLOR: [u8; 4] = [24, 24, 32, 255];
const BUBBLE_TEXT_SCALE: i32 = 3;
const BUBBLE_MARGIN: i32 = 16;
const BUBBLE_INSET: i32 = 12;
const BUBBLE_MAX_LINES: usize = 4;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Rebuilds the surface at the new window size. A minimized window
    /// reports zero size and is skipped.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render(
        &mut self,
        state: &RenderState<'_>,
        camera: &Camera,
        overlay: Option<&OverlayData<'_>>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        draw_scene(frame, viewport, state, camera);
        if let Some(dialog) = state.dialog {
            draw_dialog_bubble(frame, viewport, dialog);
        }
        if let Some(data) = overlay {
            draw_overlay(frame, viewport.width, viewport.height, data);
        }
        self.pixels.render()
    }
}

/// Map geometry, reward items, then entities in iteration order.
pub(crate) fn draw_scene(
    frame: &mut [u8],
    viewport: Viewport,
    state: &RenderState<'_>,
    camera: &Camera,
) {
    let (width, height) = (viewport.width, viewport.height);
    clear(frame, VOID_COLOR);

    let map = state.map;
    let to_screen = |rect: &Rect| rect_to_screen(rect, camera, viewport);
    fill_rect(frame, width, height, to_screen(&map.bounds()), GROUND_COLOR);

    let geometry = map.geometry();
    for zone in geometry.zones() {
        outline_rect(frame, width, height, to_screen(zone), ZONE_COLOR);
    }
    for wall in geometry.walls() {
        let rect = to_screen(wall);
        fill_rect(frame, width, height, rect, WALL_COLOR);
        outline_rect(frame, width, height, rect, WALL_EDGE_COLOR);
    }
    for exit in geometry.exits() {
        fill_rect(frame, width, height, to_screen(&exit.rect), EXIT_COLOR);
    }
    for item in map.items() {
        fill_rect(frame, width, height, to_screen(&item.rect), ITEM_COLOR);
    }

    let partner = state.dialog.map(|dialog| dialog.speaker);
    for entity in state.entities() {
        let rect = to_screen(&entity.rect());
        let color = match entity.role() {
            EntityRole::Hero => HERO_COLOR,
            EntityRole::Npc => NPC_COLOR,
        };
        fill_rect(frame, width, height, rect, color);
        outline_rect(frame, width, height, to_screen(&entity.feet()), FEET_COLOR);
        if entity.role() == EntityRole::Npc && partner == Some(entity.name()) {
            outline_rect(frame, width, height, rect, PARTNER_OUTLINE_COLOR);
        }
    }
}

/// Speaker name and wrapped text in a panel along the bottom edge.
pub(crate) fn draw_dialog_bubble(frame: &mut [u8], viewport: Viewport, dialog: DialogView<'_>) {
    let (width, height) = (viewport.width, viewport.height);
    let panel_width = width as i32 - BUBBLE_MARGIN * 2;
    let max_chars = (panel_width - BUBBLE_INSET * 2) / glyph_advance(BUBBLE_TEXT_SCALE);
    if max_chars <= 0 {
        return;
    }

    let mut lines = wrap_text(dialog.text, max_chars as usize);
    lines.truncate(BUBBLE_MAX_LINES);
    let line_height = line_advance(BUBBLE_TEXT_SCALE);
    let panel_height = (lines.len() as i32 + 1) * line_height + BUBBLE_INSET * 2;
    let panel = ScreenRect::new(
        BUBBLE_MARGIN,
        height as i32 - BUBBLE_MARGIN - panel_height,
        panel_width,
        panel_height,
    );
    fill_rect(frame, width, height, panel, BUBBLE_COLOR);
    outline_rect(frame, width, height, panel, BUBBLE_BORDER_COLOR);

    let x = panel.x + BUBBLE_INSET;
    let mut y = panel.y + BUBBLE_INSET;
    draw_text(
        frame,
        width,
        height,
        x,
        y,
        dialog.speaker,
        BUBBLE_SPEAKER_COLOR,
        BUBBLE_TEXT_SCALE,
    );
    for line in &lines {
        y += line_height;
        draw_text(
            frame,
            width,
            height,
            x,
            y,
            line,
            BUBBLE_TEXT_COLOR,
            BUBBLE_TEXT_SCALE,
        );
    }
}
