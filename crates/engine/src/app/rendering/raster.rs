//! RGBA8 software raster primitives over a `pixels` frame buffer. Every
//! write is clipped; nothing here can index outside the frame.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub(crate) fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub(crate) fn write_pixel_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(pixel) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    if color[3] == u8::MAX {
        pixel.copy_from_slice(&color);
    } else {
        blend_into(pixel, color);
    }
}

/// Source-over blend using the source alpha; destination alpha stays opaque.
fn blend_into(pixel: &mut [u8], color: [u8; 4]) {
    let alpha = u32::from(color[3]);
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let blended = (u32::from(color[channel]) * alpha + u32::from(pixel[channel]) * inverse) / 255;
        pixel[channel] = blended as u8;
    }
    pixel[3] = u8::MAX;
}

pub(crate) fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: ScreenRect, color: [u8; 4]) {
    if rect.is_empty() {
        return;
    }
    let start_x = rect.x.max(0);
    let start_y = rect.y.max(0);
    let end_x = rect.x.saturating_add(rect.width).min(width as i32);
    let end_y = rect.y.saturating_add(rect.height).min(height as i32);
    for y in start_y..end_y {
        for x in start_x..end_x {
            write_pixel_clipped(frame, width, height, x, y, color);
        }
    }
}

pub(crate) fn outline_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: ScreenRect,
    color: [u8; 4],
) {
    if rect.width <= 1 || rect.height <= 1 {
        fill_rect(frame, width, height, rect, color);
        return;
    }
    let right = rect.x + rect.width - 1;
    let bottom = rect.y + rect.height - 1;
    let edges = [
        ScreenRect::new(rect.x, rect.y, rect.width, 1),
        ScreenRect::new(rect.x, bottom, rect.width, 1),
        ScreenRect::new(rect.x, rect.y + 1, 1, rect.height - 2),
        ScreenRect::new(right, rect.y + 1, 1, rect.height - 2),
    ];
    for edge in edges {
        fill_rect(frame, width, height, edge, color);
    }
}
