pub(crate) mod raster;
mod renderer;
pub(crate) mod text;
mod transform;

pub use renderer::Renderer;
pub use transform::{world_to_screen, Camera, Viewport, ZOOM_STEP};
