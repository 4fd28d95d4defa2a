use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use courier::config::Config;
use courier::files::{self, FileError};
use courier::http::{Request, Response, ResponseBuilder, ResponseWriter, Router, StatusCode};
use courier::server;

#[derive(Debug, Parser)]
#[command(name = "courier", about = "Minimal HTTP/1.1 server")]
struct Cli {
    /// Directory where the static files are stored
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:4221
    #[arg(long)]
    listen: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::load_file(path)?,
            None => Config::load(),
        };
        if let Some(dir) = self.directory {
            cfg.directory = Some(dir);
        }
        if let Some(addr) = self.listen {
            cfg.listen_addr = addr;
        }
        if let Some(level) = self.log_level {
            cfg.log_level = level;
        }
        Ok(cfg)
    }
}

fn routes(directory: Option<PathBuf>) -> Router {
    let directory = Arc::new(directory);
    let mut router = Router::new();

    router.get("/", |r: &Request, w: &mut ResponseWriter| {
        w.respond(r, Response::ok(""));
    });

    router.get("/echo/{str}", |r: &Request, w: &mut ResponseWriter| {
        let s = r.param("str").unwrap_or_default().to_string();
        w.respond(r, Response::ok(s));
    });

    router.get("/user-agent", |r: &Request, w: &mut ResponseWriter| {
        let agent = r.header("User-Agent").unwrap_or_default().to_string();
        w.respond(r, Response::ok(agent));
    });

    let dir = Arc::clone(&directory);
    router.get("/files/*", move |r: &Request, w: &mut ResponseWriter| {
        let Some(root) = dir.as_deref() else {
            w.respond(r, Response::not_found());
            return;
        };
        let response = match files::read(root, r.wildcard().unwrap_or_default()) {
            Ok(contents) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "application/octet-stream")
                .body(contents)
                .build(),
            Err(FileError::NotFound) => Response::not_found(),
            Err(e) => {
                tracing::error!(path = %r.path, error = %e, "Unable to read file");
                Response::internal_error()
            }
        };
        w.respond(r, response);
    });

    let dir = Arc::clone(&directory);
    router.post("/files/{filename}", move |r: &Request, w: &mut ResponseWriter| {
        let Some(root) = dir.as_deref() else {
            w.respond(r, Response::internal_error());
            return;
        };
        let response = match files::write(root, r.param("filename").unwrap_or_default(), &r.body) {
            Ok(()) => Response::created(),
            Err(e) => {
                tracing::error!(path = %r.path, error = %e, "Unable to write file");
                Response::internal_error()
            }
        };
        w.respond(r, response);
    });

    router
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Cli::parse().into_config()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.level())
        .init();

    let router = routes(cfg.directory.clone());

    tokio::select! {
        res = server::run(&cfg.listen_addr, router) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
