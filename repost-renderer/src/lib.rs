//! # repost-renderer
//!
//! Renders the preview card embedded in a repost page's layout field.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use repost_renderer::{LayoutCard, LayoutRenderer};
//!
//! fn preview() {
//!     if let Ok(renderer) = LayoutRenderer::new() {
//!         let card = LayoutCard {
//!             title: "New office opens",
//!             description: "We opened a new office.",
//!             url: "https://news.example.com/new-office-opens",
//!             image_url: "https://cdn.example.com/960.jpg",
//!         };
//!         if let Ok(snippet) = renderer.render(&card) {
//!             println!("{snippet}");
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod snippet;

pub use error::RenderError;
pub use snippet::{encode_control_data, html_encode, LayoutCard, LayoutRenderer};
