mod error;
mod tmx;
mod world;

pub use error::{ContentError, ContentErrorCode, SourceLocation};
pub use tmx::{parse_tmx, MapLayout};
pub use world::{load_world, MAPS_DIR, WORLD_MANIFEST_FILE};
