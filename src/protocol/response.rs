//! Response encoding
//!
//! A handler produces exactly one [`Response`]; the encoder writes it to
//! the outbound stream as a CGI header block followed by the body. Every
//! outcome except a file download travels in a JSON envelope whose `ok`
//! flag tracks the status class.

use std::fs::File;
use std::io::{self, Read, Write};

use log::{error, info};
use serde::Serialize;
use serde_json::json;

use crate::error::FileManagerError;

/// Relay buffer for streamed downloads.
const DOWNLOAD_BUFFER_SIZE: usize = 32 * 1024;

/// One descriptor in an info result. Field order is the wire order.
#[derive(Debug, Serialize)]
pub struct PathInfo {
    /// The path exactly as the caller supplied it.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Present (and true) only when the entry is not writable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    pub ctime: i64,
    pub mtime: i64,
    /// Visible child names; directories only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kids: Option<Vec<String>>,
    /// Size in bytes; regular files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

/// A complete response: a JSON envelope, or a download streamed verbatim.
#[derive(Debug)]
pub enum Response {
    Json { status: u16, body: serde_json::Value },
    Stream { file: File, length: u64 },
}

impl Response {
    /// An `{ok, msg}` acknowledgement.
    pub fn message(status: u16, msg: impl Into<String>) -> Response {
        Response::Json {
            status,
            body: json!({"ok": (200..300).contains(&status), "msg": msg.into()}),
        }
    }

    /// A success envelope carrying a path list.
    pub fn paths<T: Serialize>(paths: Vec<T>) -> Response {
        Response::Json {
            status: 200,
            body: json!({"ok": true, "paths": paths}),
        }
    }

    /// The envelope for a failed request.
    pub fn failure(error: FileManagerError) -> Response {
        Response::message(error.status_code(), error.message())
    }

    /// A download body with its exact length from stat.
    pub fn stream(file: File, length: u64) -> Response {
        Response::Stream { file, length }
    }

    pub fn status(&self) -> u16 {
        match self {
            Response::Json { status, .. } => *status,
            Response::Stream { .. } => 200,
        }
    }

    /// The JSON body, when there is one.
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match self {
            Response::Json { body, .. } => Some(body),
            Response::Stream { .. } => None,
        }
    }
}

/// Writes the response to `out` as a CGI header block plus body.
///
/// JSON responses carry an explicit `Status:` header. Downloads rely on
/// the CGI default status and send only the content headers; once those
/// are out, a mid-stream read failure can only cut the body short.
pub fn emit(response: Response, out: &mut impl Write) -> io::Result<()> {
    match response {
        Response::Json { status, body } => {
            let encoded = body.to_string();
            info!("tx {} {}", status, encoded);
            write!(out, "Status: {}\r\n", status)?;
            write!(out, "Content-Type: application/json\r\n")?;
            write!(out, "Content-Length: {}\r\n\r\n", encoded.len())?;
            out.write_all(encoded.as_bytes())?;
        }
        Response::Stream { mut file, length } => {
            write!(out, "Content-Type: application/octet-stream\r\n")?;
            write!(out, "Content-Length: {}\r\n\r\n", length)?;
            let mut buf = [0u8; DOWNLOAD_BUFFER_SIZE];
            loop {
                match file.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => out.write_all(&buf[..n])?,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        error!("download read failed: {}", e);
                        break;
                    }
                }
            }
        }
    }
    out.flush()
}
