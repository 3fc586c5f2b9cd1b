pub mod config;
pub mod site;
pub mod types;

pub use config::{Config, Settings};
pub use site::SiteConfig;
pub use types::{BuildOptions, FrontMatter, Mode, Post, ServeOptions};
