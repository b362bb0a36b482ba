//! Request/response protocol
//!
//! Query-string decoding, routing, and CGI response encoding.

pub mod query;
pub mod request;
pub mod response;

pub use query::QueryParams;
pub use request::{Method, Route};
pub use response::{PathInfo, Response};
