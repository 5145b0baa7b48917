//! Quest previews for tutorial pages.
//!
//! [`extract`] scrapes the "Quest" and "Author" sections out of a page's HTML.
//! [`Previewer`] caches results per page and tracks which page is on display,
//! and [`render_preview`] turns a result into Markdown.

pub mod cli;
pub mod content;
pub mod extractor;
pub mod heading;
pub mod preview;
pub mod render;
pub mod runner;

pub use extractor::{extract, extract_labeled, ExtractionResult, QuestImage};
pub use preview::{PreviewTicket, Previewer};
pub use render::{fix_image_paths, render_preview, render_unavailable, PreviewState};
