//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color palette and text styles
//! - `tabs`: Per-tab content (storefront pages and the admin console)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
