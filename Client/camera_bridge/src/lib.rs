pub mod args;
pub mod bridge;
pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod memory;
pub mod metrics;
pub mod registry;
pub mod relay;
pub mod types;

pub use error::BridgeError;
pub use ffi::build_binding_inventory;
