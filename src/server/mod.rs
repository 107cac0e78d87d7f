//! JSON view over the record directory.
//!
//! Requests are served one at a time on the calling thread. Each request
//! rescans the directory, so the view is always as fresh as the files.

use std::net::SocketAddr;

use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

use crate::config::AppSettings;

mod routes;
mod views;

pub use routes::{Reply, ServerState, route};

/// Errors that stop the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to listen on {addr}: {reason}")]
    Bind { addr: String, reason: String },
    #[error("Failed to accept request: {0}")]
    Receive(#[from] std::io::Error),
}

/// Bound HTTP listener plus the state its handlers read.
pub struct RecordServer {
    server: Server,
    state: ServerState,
}

impl RecordServer {
    /// Listen on `settings.bind_addr`, serving `settings.records_dir`.
    pub fn bind(settings: &AppSettings) -> Result<Self, ServerError> {
        let server = Server::http(settings.bind_addr.as_str()).map_err(|err| ServerError::Bind {
            addr: settings.bind_addr.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            server,
            state: ServerState {
                records_dir: settings.records_dir.clone(),
                probes: settings.probes.clone(),
            },
        })
    }

    /// Address actually bound, useful when the configured port is 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until the listener fails.
    pub fn serve(&self) -> Result<(), ServerError> {
        info!(
            addr = ?self.local_addr(),
            records = %self.state.records_dir.display(),
            "Serving record view"
        );
        loop {
            self.handle_next()?;
        }
    }

    /// Block for one request and answer it.
    pub fn handle_next(&self) -> Result<(), ServerError> {
        let request = self.server.recv()?;
        self.respond(request);
        Ok(())
    }

    fn respond(&self, request: Request) {
        let reply = route(request.method(), request.url(), &self.state);
        debug!(
            method = ?request.method(),
            url = request.url(),
            status = reply.status,
            "Handled request"
        );
        let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
        for (name, value) in [
            ("Content-Type", "application/json"),
            ("Access-Control-Allow-Origin", "*"),
        ] {
            if let Ok(header) = Header::from_bytes(name, value) {
                response = response.with_header(header);
            }
        }
        if let Err(err) = request.respond(response) {
            warn!(error = %err, "Failed to send response");
        }
    }
}
