mod loader;

pub use loader::{glob_match, Config, EventHandlerConfig, HeuristicsConfig, ImportsConfig};
