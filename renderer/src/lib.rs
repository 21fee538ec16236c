pub mod config;
pub mod context;
pub mod error;
pub mod render;

pub use config::{EngineConfig, load_from};
pub use context::RenderContext;
pub use error::RenderError;
pub use render::{RenderedDocument, render_document, render_str};
