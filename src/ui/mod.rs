pub mod browser;
pub mod widgets;

pub use browser::{BrowserView, render_browser_view, render_help_overlay};
