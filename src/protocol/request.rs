//! Request routing
//!
//! Maps the CGI invocation variables onto the two things a request is:
//! an HTTP method and one of the five logical operations.

use std::fmt;

/// The accepted HTTP methods. Anything else is refused up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Parses a REQUEST_METHOD value. Matching is exact; CGI servers pass
    /// the method through in its canonical uppercase form.
    pub fn parse(raw: &str) -> Option<Method> {
        match raw {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// The five logical operations, selected by PATH_INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Info,
    Get,
    Put,
    Mkdir,
    Delete,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        match path {
            "/info" => Some(Route::Info),
            "/get" => Some(Route::Get),
            "/put" => Some(Route::Put),
            "/mkdir" => Some(Route::Mkdir),
            "/delete" => Some(Route::Delete),
            _ => None,
        }
    }

    /// Whether `method` is permitted on this route. The two mutating
    /// uploads, put and mkdir, are POST-only; the rest accept both.
    pub fn allows(&self, method: Method) -> bool {
        match self {
            Route::Put | Route::Mkdir => method == Method::Post,
            Route::Info | Route::Get | Route::Delete => true,
        }
    }
}
