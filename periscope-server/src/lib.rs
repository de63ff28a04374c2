pub mod admission;
pub mod config;
pub mod error;
pub mod hub;
pub mod server;
pub mod signaling;

pub use config::ServerConfig;
pub use error::AdmissionError;
pub use hub::{FrameSink, Hub};
pub use server::{app, run, serve};
