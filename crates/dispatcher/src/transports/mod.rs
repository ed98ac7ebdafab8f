//! Transport implementations
//!
//! Contains HttpTransport, LogTransport, RecordingTransport and the
//! config-selected AnyTransport.

mod any;
mod http;
mod log;
mod recording;

pub use self::any::AnyTransport;
pub use self::http::{HttpTransport, HttpTransportConfig};
pub use self::log::LogTransport;
pub use self::recording::RecordingTransport;
