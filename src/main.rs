//! filemanager - CGI entry point
//!
//! A per-request file-management endpoint. The hosting web server runs one
//! process for each request, passing REQUEST_METHOD, PATH_INFO and
//! QUERY_STRING through the environment; the request body arrives on stdin
//! and the response leaves on stdout. The --method, --path and --query
//! flags stand in for the CGI variables when debugging offline.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

use log::{error, info};

use filemanager::config::{Overrides, Settings};
use filemanager::context::RequestContext;
use filemanager::handlers;
use filemanager::logging::{self, LogDestination};
use filemanager::protocol::QueryParams;
use filemanager::protocol::response::{self, Response};
use filemanager::storage::ConfinedRoot;

#[derive(Default)]
struct Args {
    overrides: Overrides,
    method: Option<String>,
    path: Option<String>,
    query: Option<String>,
}

/// Parses the argument list. Every flag takes a value; anything else,
/// including a flag with its value missing, stops the scan and comes
/// back as the offending argument alongside the flags read before it.
fn parse_args(argv: impl IntoIterator<Item = String>) -> (Args, Option<String>) {
    let mut args = Args::default();
    let mut argv = argv.into_iter();
    while let Some(arg) = argv.next() {
        let slot = match arg.as_str() {
            "--root" => &mut args.overrides.root,
            "--log" => &mut args.overrides.log,
            "--method" => &mut args.method,
            "--path" => &mut args.path,
            "--query" => &mut args.query,
            _ => return (args, Some(arg)),
        };
        match argv.next() {
            Some(value) => *slot = Some(value),
            None => return (args, Some(arg)),
        }
    }
    (args, None)
}

fn help(settings: &Settings) {
    println!("Usage: filemanager runs as a CGI script.");
    println!("No REQUEST_METHOD found in the environment, so this is not a CGI invocation.");
    println!();
    println!("  --root <dir>           root directory all operations are confined to");
    println!("  --log <file|\"syslog\">  where to write log lines; optional");
    println!("  --method <GET|POST>    stand-in for REQUEST_METHOD when debugging offline");
    println!("  --path <script path>   stand-in for PATH_INFO, e.g. /info");
    println!("  --query <string>       stand-in for QUERY_STRING");
    println!();
    println!("The root directory and log destination can also come from the");
    println!("FILEMANAGER_ROOT and FILEMANAGER_LOG environment variables.");
    println!(
        "  Default root directory: {}",
        settings.root().unwrap_or("unspecified")
    );
    println!(
        "  Default logfile: {}",
        settings.log().unwrap_or("unspecified")
    );
}

fn respond(response: Response, out: &mut impl Write) {
    if let Err(e) = response::emit(response, out) {
        error!("tx write: {}", e);
    }
}

fn main() {
    let (args, unknown) = parse_args(env::args().skip(1));

    // Settings still load when an argument was rejected; the flags read
    // before the offending one have already been captured.
    let cli_log = args.overrides.log.clone();
    let settings = Settings::load(args.overrides);

    // The sink is installed before the first response so startup failures
    // reach the log. On a config failure the --log flag and the plain
    // environment variable are all there is to go by.
    let destination = match &settings {
        Ok(settings) => settings.log().map(LogDestination::parse),
        Err(_) => cli_log
            .or_else(|| env::var("FILEMANAGER_LOG").ok())
            .as_deref()
            .map(LogDestination::parse),
    };
    logging::init(destination);

    let mut stdout = io::stdout();

    // Argument errors still produce a well-formed CGI response.
    if let Some(bad) = unknown {
        respond(
            Response::message(500, format!("unknown argument \"{}\"", bad)),
            &mut stdout,
        );
        return;
    }

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            respond(Response::message(500, format!("config: {}", e)), &mut stdout);
            return;
        }
    };

    // No method means no CGI environment; print usage instead.
    let Some(method) = args.method.or_else(|| env::var("REQUEST_METHOD").ok()) else {
        help(&settings);
        return;
    };

    let Some(root) = settings.root() else {
        respond(
            Response::message(500, "root directory not specified"),
            &mut stdout,
        );
        return;
    };

    let Some(path) = args.path.or_else(|| env::var("PATH_INFO").ok()) else {
        respond(Response::message(500, "path not specified"), &mut stdout);
        return;
    };

    let query = args
        .query
        .map(OsString::from)
        .or_else(|| env::var_os("QUERY_STRING"))
        .unwrap_or_default();
    info!("rx: path={} query={}", path, query.to_string_lossy());

    let root = match ConfinedRoot::confine(root) {
        Ok(root) => root,
        Err(e) => {
            respond(Response::failure(e.into()), &mut stdout);
            return;
        }
    };

    let ctx = RequestContext::new(root, QueryParams::parse(query.as_bytes()));
    let response = handlers::dispatch(&ctx, &method, &path, &mut io::stdin().lock());
    respond(response, &mut stdout);
}
