use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::debug;

use crate::http::error::HttpError;
use crate::http::parser::parse_request;
use crate::http::request::Request;
use crate::http::router::Router;
use crate::http::writer::ResponseWriter;

/// One accepted client connection, served request by request until either
/// side asks to close or the byte stream stops making sense.
pub struct Connection<S> {
    stream: BufReader<S>,
    router: Arc<Router>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>) -> Self {
        Self {
            stream: BufReader::new(stream),
            router,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to completion.
    ///
    /// Returns an error for anything that killed the connection early; no
    /// response is attempted in that case.
    pub async fn run(&mut self) -> Result<(), HttpError> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match parse_request(&mut self.stream).await? {
                    Some(req) => ConnectionState::Processing(req),
                    None => {
                        debug!("Client closed connection");
                        ConnectionState::Closed
                    }
                },

                ConnectionState::Processing(mut req) => {
                    let mut writer = ResponseWriter::new();
                    self.router.handle(&mut req, &mut writer);

                    let keep_alive = !req.wants_close() && !writer.closes_connection();
                    ConnectionState::Writing(writer, keep_alive)
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(self.stream.get_mut()).await?;

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}
