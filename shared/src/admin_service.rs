use crate::http::make_boxed_error_response;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// Reports whether the process can serve traffic yet.
pub trait ReadinessProbe: Send + Sync {
    fn is_ready(&self) -> bool;

    /// Extra line appended to a successful `/ready` body.
    fn describe(&self) -> Option<String> {
        None
    }
}

/// Serves `/health` (process is up) and `/ready` (startup barrier passed).
pub struct AdminService<E> {
    probe: Arc<dyn ReadinessProbe>,
    _error: PhantomData<fn() -> E>,
}

impl<E> AdminService<E> {
    pub fn new(probe: Arc<dyn ReadinessProbe>) -> Self {
        Self {
            probe,
            _error: PhantomData,
        }
    }
}

fn text_body(text: String) -> BoxBody<Bytes, Infallible> {
    Full::new(Bytes::from(text)).boxed()
}

impl<E> Service<Request<Incoming>> for AdminService<E>
where
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, Infallible>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let response = route(self.probe.as_ref(), req.method(), req.uri().path());
        Box::pin(async move { Ok(response) })
    }
}

fn route(
    probe: &dyn ReadinessProbe,
    method: &Method,
    path: &str,
) -> Response<BoxBody<Bytes, Infallible>> {
    if method != Method::GET {
        return make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    match path {
        "/health" => Response::new(text_body("ok\n".into())),
        "/ready" if probe.is_ready() => {
            let body = match probe.describe() {
                Some(detail) => format!("ok\n{detail}\n"),
                None => "ok\n".into(),
            };
            Response::new(text_body(body))
        }
        "/ready" => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
        _ => make_boxed_error_response(StatusCode::NOT_FOUND),
    }
}
