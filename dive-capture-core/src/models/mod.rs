pub mod artifact;
pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod state;
