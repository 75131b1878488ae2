// handlers/mod.rs - HTTP handlers for site content
//
// Authentication sits in front of this service; every route here trusts its caller.

pub mod content;
pub mod preview;

pub use content::{get as content_get, put as content_put};
pub use preview::{derive as preview_derive, normalize as preview_normalize};

use content_grid_api::content::ContentService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub content: ContentService,
}
