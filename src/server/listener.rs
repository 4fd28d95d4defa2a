use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::http::connection::Connection;
use crate::http::router::Router;

/// Binds `addr` and serves `router` until the accept loop fails.
pub async fn run(addr: &str, router: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, router).await
}

/// Accepts connections forever, one task per connection.
///
/// The route table is frozen here; every connection shares it read-only.
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    let router = Arc::new(router);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, router);
            match conn.run().await {
                Ok(()) => debug!(peer = %peer, "Connection closed"),
                Err(e) => warn!(peer = %peer, error = %e, "Connection dropped"),
            }
        });
    }
}
