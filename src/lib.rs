pub mod config;
pub mod extract;
pub mod fetch;
pub mod links;
pub mod pipeline;
pub mod table;

pub use config::{Config, LinkResolution};
pub use pipeline::{run, RunOutcome, RunSummary};
