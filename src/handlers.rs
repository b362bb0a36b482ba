//! Operation handlers for the file manager.
//!
//! This module routes a request to one of the five operations and carries
//! each of them out against the confined root: listing metadata, streaming
//! downloads, storing uploads, creating directories, and deleting
//! subtrees.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::MetadataExt;

use log::error;

use crate::context::RequestContext;
use crate::error::FileManagerError;
use crate::protocol::request::{Method, Route};
use crate::protocol::response::{PathInfo, Response};
use crate::storage::root::ResolvedPath;
use crate::storage::{TraversalEntry, permissions, traverse_into, validation};

/// Relay buffer for uploads read from the request body.
const UPLOAD_BUFFER_SIZE: usize = 64 * 1024;

/// Routes a request to its operation handler.
///
/// # Arguments
///
/// * `ctx` - The confined root and decoded query parameters.
/// * `method` - The raw REQUEST_METHOD value.
/// * `path` - The raw PATH_INFO value selecting the operation.
/// * `body` - The request body stream; only put consumes it.
///
/// # Returns
///
/// * `Response` - The complete response, for any outcome.
pub fn dispatch(ctx: &RequestContext, method: &str, path: &str, body: &mut dyn Read) -> Response {
    let Some(parsed) = Method::parse(method) else {
        return Response::failure(FileManagerError::MethodNotAllowed(format!(
            "method \"{}\" invalid for \"{}\"",
            method,
            path.strip_prefix('/').unwrap_or(path)
        )));
    };
    let Some(route) = Route::parse(path) else {
        return Response::failure(FileManagerError::UnknownRoute(format!(
            "invalid script path \"{}\"",
            path
        )));
    };
    if !route.allows(parsed) {
        return Response::failure(FileManagerError::MethodNotAllowed(format!(
            "method \"{}\" invalid for \"{}\"",
            parsed,
            path.strip_prefix('/').unwrap_or(path)
        )));
    }
    match route {
        Route::Info => handle_info(ctx),
        Route::Get => handle_get(ctx),
        Route::Put => handle_put(ctx, body),
        Route::Mkdir => handle_mkdir(ctx),
        Route::Delete => handle_delete(ctx),
    }
}

/// Handles the info operation: reports metadata for every requested path.
///
/// Paths that fail validation or cannot be described are skipped rather
/// than failing the request; with no path parameter at all the root itself
/// is described. The response is always a 200 with whatever survived.
fn handle_info(ctx: &RequestContext) -> Response {
    let mut found = false;
    let mut paths = Vec::new();
    for value in ctx.query.all("path") {
        found = true;
        let Ok(resolved) = ctx.root.resolve(value) else {
            continue;
        };
        if let Some(entry) = describe(&resolved, value) {
            paths.push(entry);
        }
    }
    if !found {
        if let Some(entry) = describe(&ctx.root.root_path(), "") {
            paths.push(entry);
        }
    }
    Response::paths(paths)
}

/// Builds the descriptor for one resolved path, reporting it under the
/// name the caller used. Returns None for anything that should be skipped:
/// a failed stat, an unreadable file, an unlistable directory, or an entry
/// that is neither a regular file nor a directory.
fn describe(resolved: &ResolvedPath, reported: &str) -> Option<PathInfo> {
    let abs = resolved.as_path();
    let meta = fs::metadata(abs).ok()?;
    if meta.is_dir() {
        let listing = fs::read_dir(abs).ok()?;
        let mut kids = Vec::new();
        for entry in listing.flatten() {
            let name = entry.file_name();
            if validation::is_hidden_name(&name) {
                continue;
            }
            let kid = abs.join(&name);
            let Ok(kid_meta) = fs::metadata(&kid) else {
                continue;
            };
            let visible = if kid_meta.is_dir() {
                permissions::is_traversable(&kid)
            } else {
                permissions::is_readable(&kid)
            };
            if visible {
                kids.push(name.to_string_lossy().into_owned());
            }
        }
        Some(PathInfo {
            path: reported.to_string(),
            kind: "dir",
            readonly: (!permissions::is_writable(abs)).then_some(true),
            ctime: meta.ctime(),
            mtime: meta.mtime(),
            kids: Some(kids),
            length: None,
        })
    } else if meta.is_file() && permissions::is_readable(abs) {
        Some(PathInfo {
            path: reported.to_string(),
            kind: "file",
            readonly: (!permissions::is_writable(abs)).then_some(true),
            ctime: meta.ctime(),
            mtime: meta.mtime(),
            kids: None,
            length: Some(meta.len()),
        })
    } else {
        None
    }
}

/// Handles the get operation: streams the first requested file back.
fn handle_get(ctx: &RequestContext) -> Response {
    let Some(value) = ctx.query.first("path") else {
        return Response::failure(FileManagerError::InvalidInput("missing path".to_string()));
    };
    let resolved = match ctx.root.resolve(value) {
        Ok(resolved) => resolved,
        Err(e) => return Response::failure(e.into()),
    };
    let abs = resolved.as_path();
    let meta = match fs::metadata(abs) {
        Ok(meta) => meta,
        Err(e) => {
            error!("get stat \"{}\": {}", abs.display(), e);
            return Response::failure(FileManagerError::NotFound(format!(
                "get stat \"{}\": {}",
                resolved.relative(),
                e
            )));
        }
    };
    match File::open(abs) {
        Ok(file) => Response::stream(file, meta.len()),
        Err(e) => {
            error!("get open \"{}\": {}", abs.display(), e);
            Response::failure(FileManagerError::NotFound(format!("get open: {}", e)))
        }
    }
}

/// Handles the put operation: stores the request body at the requested
/// path, either from scratch or appended at the exact current size.
fn handle_put(ctx: &RequestContext, body: &mut dyn Read) -> Response {
    // 1. Target path.
    let Some(value) = ctx.query.first("path") else {
        return Response::failure(FileManagerError::InvalidInput("missing path".to_string()));
    };
    let resolved = match ctx.root.resolve(value) {
        Ok(resolved) => resolved,
        Err(e) => return Response::failure(e.into()),
    };

    // 2. Resume offset: the first non-empty off value, if any.
    let offset = match ctx.query.all("off").find(|v| !v.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => {
                return Response::failure(FileManagerError::InvalidInput(format!(
                    "invalid off \"{}\"",
                    raw
                )));
            }
        },
    };

    // 3. Open mode: create or truncate for a fresh write, append for a
    //    continuation whose offset matches the current size exactly. The
    //    size check and the open are not atomic; concurrent writers to the
    //    same path can race between them.
    let abs = resolved.as_path();
    let fresh = matches!(offset, None | Some(0));
    let mut options = OpenOptions::new();
    options.write(true);
    if (!permissions::exists(abs) || permissions::is_writable(abs)) && fresh {
        options.create(true).truncate(true);
    } else if let Err(e) = permissions::check_writable(abs) {
        error!("put access \"{}\": not writable", abs.display());
        return Response::failure(FileManagerError::Forbidden(format!("not writable: {}", e)));
    } else {
        let meta = match fs::metadata(abs) {
            Ok(meta) => meta,
            Err(e) => {
                error!("put stat \"{}\": {}", abs.display(), e);
                return Response::failure(FileManagerError::Internal(format!("put stat: {}", e)));
            }
        };
        if !meta.is_file() {
            return Response::failure(FileManagerError::Forbidden("not a file".to_string()));
        }
        let requested = offset.unwrap_or(0);
        if requested != meta.len() {
            return Response::failure(FileManagerError::InvalidInput(format!(
                "offset {} should be {}",
                requested,
                meta.len()
            )));
        }
        options.append(true);
    }

    // 4. Create missing parent directories; a failure here surfaces at open.
    if let Some(parent) = abs.parent() {
        let _ = fs::create_dir_all(parent);
    }

    // 5. Open the target.
    let mut file = match options.open(abs) {
        Ok(file) => file,
        Err(e) => {
            error!("put open \"{}\": {}", abs.display(), e);
            return Response::failure(FileManagerError::Forbidden(format!("put open: {}", e)));
        }
    };

    // 6. Relay the body to the file and report the byte count.
    let mut buf = [0u8; UPLOAD_BUFFER_SIZE];
    let mut written: u64 = 0;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("put read: {}", e);
                return Response::failure(FileManagerError::Internal(format!("put read: {}", e)));
            }
        };
        if let Err(e) = file.write_all(&buf[..n]) {
            error!("put write \"{}\": {}", abs.display(), e);
            return Response::failure(FileManagerError::Internal(format!("put write: {}", e)));
        }
        written += n as u64;
    }
    Response::message(200, format!("wrote {} bytes", written))
}

/// Handles the mkdir operation: creates exactly one new directory.
fn handle_mkdir(ctx: &RequestContext) -> Response {
    let Some(value) = ctx.query.first("path") else {
        return Response::failure(FileManagerError::InvalidInput("missing path".to_string()));
    };
    let resolved = match ctx.root.resolve(value) {
        Ok(resolved) => resolved,
        Err(e) => return Response::failure(e.into()),
    };
    let abs = resolved.as_path();
    if permissions::exists(abs) {
        error!("mkdir \"{}\": path exists", abs.display());
        return Response::failure(FileManagerError::Forbidden("mkdir: path exists".to_string()));
    }
    match fs::create_dir(abs) {
        Ok(()) => Response::message(200, format!("mkdir \"{}\"", resolved.relative())),
        Err(e) => {
            error!("mkdir \"{}\": {}", abs.display(), e);
            Response::failure(FileManagerError::Forbidden(format!("mkdir: {}", e)))
        }
    }
}

/// Handles the delete operation: removes every requested subtree, or
/// nothing at all.
///
/// The traversal lists are validated in full before the first removal, so
/// a refusal cannot leave a half-deleted tree behind. A removal failure
/// after that point stops the commit where it stands.
fn handle_delete(ctx: &RequestContext) -> Response {
    // 1. Resolve and traverse every requested path into one flat list.
    let mut found = false;
    let mut entries: Vec<TraversalEntry> = Vec::new();
    for value in ctx.query.all("path") {
        found = true;
        let resolved = match ctx.root.resolve(value) {
            Ok(resolved) => resolved,
            Err(e) => return Response::failure(e.into()),
        };
        if let Err(e) = traverse_into(&ctx.root, resolved, &mut entries) {
            error!("{}", e);
            return Response::failure(e.into());
        }
    }
    if !found {
        return Response::failure(FileManagerError::InvalidInput("missing path".to_string()));
    }

    // 2. Validate everything before touching anything.
    for entry in &entries {
        let rel = entry.path.relative();
        if let Some(parent) = validation::hidden_segment_parent(rel) {
            return Response::failure(FileManagerError::InvalidInput(format!(
                "directory not empty \"{}\"",
                parent
            )));
        }
        let abs = entry.path.as_path();
        let removable = if entry.is_dir {
            permissions::is_removable_dir(abs)
        } else {
            permissions::is_removable_file(abs)
        };
        if !removable {
            let kind = if entry.is_dir { "dir" } else { "file" };
            error!("delete access {} \"{}\": not writable", kind, abs.display());
            return Response::failure(FileManagerError::Forbidden(format!(
                "delete not writable \"{}\"",
                rel
            )));
        }
    }

    // 3. Commit in the same order; post-order guarantees children go
    //    before their directory.
    let mut removed = Vec::with_capacity(entries.len());
    for entry in &entries {
        let abs = entry.path.as_path();
        let result = if entry.is_dir {
            fs::remove_dir(abs)
        } else {
            fs::remove_file(abs)
        };
        if let Err(e) = result {
            let op = if entry.is_dir { "rmdir" } else { "unlink" };
            error!("{} \"{}\": {}", op, abs.display(), e);
            return Response::failure(FileManagerError::Internal(format!(
                "{} \"{}\": {}",
                op,
                entry.path.relative(),
                e
            )));
        }
        removed.push(entry.marker());
    }
    Response::paths(removed)
}
