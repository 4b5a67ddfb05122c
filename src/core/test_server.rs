/*-------------------------------------------------------------------------------------------------
  Local HTTP Server for Tests
-------------------------------------------------------------------------------------------------*/

use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A listener bound to an ephemeral localhost port. Bind first so that handlers can be built
/// with the server's own URL (for `nextLink` style responses), then serve the router.
pub(crate) struct TestServer {
    listener: TcpListener,
    url: String,
}

impl TestServer {
    pub(crate) async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, url }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// Serve `router` in the background and return the server's URL.
    pub(crate) fn serve(self, router: Router) -> String {
        tokio::spawn(async move { axum::serve(self.listener, router).await.unwrap() });
        self.url
    }
}

/// Requests seen by a handler, shared between the handler and the test.
pub(crate) type Recorded<T> = Arc<Mutex<Vec<T>>>;

pub(crate) fn recorded<T>() -> Recorded<T> {
    Arc::new(Mutex::new(Vec::new()))
}
