use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Accepts connections on `host:port` forever, serving each one with `service`.
pub async fn run_http_service<S, E>(host: &str, port: u16, service: S) -> Result<(), E>
where
    S: Service<Request<Incoming>, Response = Response<BoxBody<Bytes, Infallible>>, Error = E>
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    E: From<std::io::Error> + std::error::Error + Send + Sync + 'static,
{
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(host, port, "HTTP service listening");
    let service_arc = Arc::new(service);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let io = TokioIo::new(stream);
        let svc = service_arc.clone();

        // Hand the connection to hyper; auto-detect h1/h2 on this socket
        tokio::spawn(async move {
            if let Err(e) = Builder::new(TokioExecutor::new())
                .serve_connection(io, svc)
                .await
            {
                tracing::debug!(peer = %peer_addr, error = %e, "Connection closed with error");
            }
        });
    }
}

/// Plain-text response carrying the canonical reason phrase of `status`.
pub fn make_error_response(status: StatusCode) -> Response<Bytes> {
    let reason = status.canonical_reason().unwrap_or("error");
    let mut response = Response::new(Bytes::from(format!("{reason}\n")));
    *response.status_mut() = status;
    response
}

pub fn make_boxed_error_response(status: StatusCode) -> Response<BoxBody<Bytes, Infallible>> {
    let (parts, body) = make_error_response(status).into_parts();
    Response::from_parts(parts, Full::new(body).boxed())
}
