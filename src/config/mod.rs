//! Configuration management for tally

mod paths;
mod settings;

pub use paths::TallyPaths;
pub use settings::Settings;
