pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod storage;

pub use context::RequestContext;
