pub mod config;
pub mod error;
pub mod highlight;
pub mod navigation;
pub mod templates;

pub use config::Config;
pub use error::ConfigError;
pub use highlight::HighlightConfig;
pub use navigation::NavigationItem;
