//! Configuration sections of `news-view.toml`.

mod content;
mod feed;
mod serve;

pub use content::{ContentConfig, TemplateConfig};
pub use feed::{FeedConfig, FeedFormat};
pub use serve::ServeConfig;
