pub mod composite;
pub mod history;
pub mod input;
pub mod loader;
pub mod mapper;
pub mod messages;
pub mod model;
pub mod render;
pub mod save;
pub mod service;
pub mod settings;
pub mod settings_store;
pub mod toolbar;

pub use loader::{FsImageLoader, ImageLoader, ImageSource};
pub use mapper::{PointerPosition, SurfaceRect};
pub use model::{BrushConfig, Color, Eye, Point, Stroke, SurfaceSize};
pub use service::{EyeDiagram, MountOptions};
