//! Re-rendering of model-produced summaries into alternate presentation
//! formats. Both renderers share the block model in [`crate::markdown`].

pub mod html;
pub mod text;

pub use html::render_html;
pub use text::{render_text, render_text_with, TableFormat};
