// Metronome Core - Domain Model & Ports
// NO HTTP dependencies: the sdk crate owns the transport

pub mod application;
pub mod domain;
pub mod port;

pub use domain::error::{Result, ValidationError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
