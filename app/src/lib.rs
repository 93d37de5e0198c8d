pub mod clients;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod log;
pub mod output;
pub mod pipeline;

pub use error::{Error, ErrorKind};
