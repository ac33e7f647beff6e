//! A small server exercising routing, parameters, middlewares and gzip.
//!
//! ```text
//! cargo run --example file_server -- --directory /tmp/burrow
//!
//! curl -v http://127.0.0.1:4221/echo/abc?repeat=true
//! curl -v -H 'Accept-Encoding: gzip' http://127.0.0.1:4221/echo/abc --output -
//! curl -v -A 'burrow-demo' http://127.0.0.1:4221/user-agent
//! curl -v --data-binary 'hello' http://127.0.0.1:4221/files/hello.txt
//! curl -v http://127.0.0.1:4221/files/hello.txt
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use burrow_web::middleware::middleware_fn;
use burrow_web::{Handler, Request, Response, RouteError, Router, Server, SharedHandler, make_handler};
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "file_server")]
#[command(about = "echo, user-agent and a tiny file store on top of burrow", long_about = None)]
struct Cli {
    /// Directory read by `GET /files/{filename}` and written by `POST /files/{filename}`
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    #[arg(short, long, default_value = "0.0.0.0:4221")]
    address: String,
}

/// Where the `/files` handlers read and write.
#[derive(Debug, Clone)]
struct FilesConfig {
    directory: Arc<PathBuf>,
}

impl FilesConfig {
    fn new(directory: PathBuf) -> Self {
        Self { directory: Arc::new(directory) }
    }

    /// `None` for names that would leave the directory.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        match filename {
            "" | "." | ".." => None,
            name if name.contains(['/', '\\']) => None,
            name => Some(self.directory.join(name)),
        }
    }
}

async fn home(_req: Request) -> Response {
    Response::ok()
}

async fn echo(req: Request) -> Response {
    let content = req.param("str").unwrap_or_default();
    let content = if req.query("repeat") == Some("true") { content.repeat(2) } else { content.to_string() };

    Response::ok().header("Content-Type", mime::TEXT_PLAIN.as_ref()).body(content)
}

async fn user_agent(req: Request) -> Response {
    let user_agent = req.headers().get("User-Agent").unwrap_or_default().to_string();
    Response::ok().header("Content-Type", mime::TEXT_PLAIN.as_ref()).body(user_agent)
}

async fn get_file(files: FilesConfig, req: Request) -> Response {
    let Some(path) = req.param("filename").and_then(|filename| files.resolve(filename)) else {
        return Response::not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => Response::ok().header("Content-Type", mime::APPLICATION_OCTET_STREAM.as_ref()).body(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Response::not_found(),
        Err(e) => {
            warn!(path = %path.display(), cause = %e, "failed to read file");
            Response::not_found()
        }
    }
}

async fn create_file(files: FilesConfig, req: Request) -> Response {
    let Some(path) = req.param("filename").and_then(|filename| files.resolve(filename)) else {
        return Response::not_found();
    };

    if let Err(e) = tokio::fs::write(&path, req.body_bytes()).await {
        warn!(path = %path.display(), cause = %e, "failed to write file");
    }
    Response::created()
}

fn router(files: FilesConfig) -> Result<Router, RouteError> {
    let read_files = files.clone();
    let write_files = files;

    Router::builder()
        .middleware(middleware_fn(|req: Request, next: SharedHandler| async move {
            let url = req.url().to_string();
            info!(%url, "receiving call");
            let response = next.call(req).await;
            info!(%url, "received call");
            response
        }))
        .middleware(middleware_fn(|req: Request, next: SharedHandler| async move {
            let start = Instant::now();
            let method = req.method().clone();
            let url = req.url().to_string();
            let response = next.call(req).await;
            info!(%method, %url, status = response.status().as_u16(), elapsed = ?start.elapsed(), "request done");
            response
        }))
        .get("/", make_handler(home))
        .get("/echo/{str}", make_handler(echo))
        .get("/user-agent", make_handler(user_agent))
        .get(
            "/files/{filename}",
            make_handler(move |req: Request| get_file(read_files.clone(), req)),
        )
        .post(
            "/files/{filename}",
            make_handler(move |req: Request| create_file(write_files.clone(), req)),
        )
        .build()
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    info!(directory = %cli.directory.display(), "serving files");

    let router = match router(FilesConfig::new(cli.directory)) {
        Ok(router) => router,
        Err(e) => {
            error!(cause = %e, "invalid route");
            return;
        }
    };

    let server = match Server::builder().router(router).address(cli.address.as_str()).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server configuration");
            return;
        }
    };

    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped with error");
    }
}
