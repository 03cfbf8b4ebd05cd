//! Serves a [`Dispatcher`] through hyper 1.x.
//!
//! ```rust,ignore
//! let service = MuxService::new(Arc::new(dispatcher));
//! let io = TokioIo::new(stream);
//! http1::Builder::new().serve_connection(io, service).await?;
//! ```

use crate::dispatcher::Dispatcher;
use crate::exchange::{Exchange, Request};
use crate::status::Status;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::service::Service;
use hyper::{Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Clone)]
pub struct MuxService {
    dispatcher: Arc<Dispatcher>,
}

impl MuxService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl<B> Service<hyper::Request<B>> for MuxService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: hyper::Request<B>) -> Self::Future {
        let dispatcher = self.dispatcher.clone();
        Box::pin(async move {
            let mut exchange = match create_exchange(request).await {
                Ok(exchange) => exchange,
                Err(message) => {
                    log::warn!("Could not read request body: {message}");
                    return Ok(plain_response(Status::BAD_REQUEST));
                }
            };
            let status = dispatcher.dispatch(&mut exchange).await;
            log::trace!("Exchange {} finished with chain status {status}", exchange.uuid());
            Ok(into_response(exchange))
        })
    }
}

/// Collects the body and copies method, path, query and headers into an
/// exchange. The path is percent-decoded before routing; repeated header
/// fields are combined into one comma separated value.
pub async fn create_exchange<B>(request: hyper::Request<B>) -> Result<Exchange, String>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = request.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| e.to_string())?
        .to_bytes();

    let path = percent_decode_str(parts.uri.path()).decode_utf8_lossy();
    let query = parts.uri.query().map(str::to_string);
    let mut converted =
        Request::from_parts(parts.method.as_str(), path.as_ref(), query).with_body(body.to_vec());
    for (name, value) in parts.headers.iter() {
        match value.to_str() {
            Ok(value) => converted.headers_mut().append(name.as_str(), value),
            Err(_) => log::debug!("Skipping non-visible ASCII header '{name}'"),
        }
    }
    Ok(Exchange::new(converted))
}

/// Builds the hyper response from what handlers and interceptors wrote. The
/// status is the one set on the [`Response`](crate::exchange::Response), or
/// 200 when nothing set one.
pub fn into_response(exchange: Exchange) -> Response<Full<Bytes>> {
    let (_, mut response) = exchange.into_parts();
    let code = response.status().unwrap_or(Status::OK);

    let mut builder = Response::builder().status(status_code(code));
    for (name, value) in response.headers().iter() {
        builder = builder.header(name, value);
    }
    let body = Full::new(Bytes::from(response.take_body()));
    match builder.body(body) {
        Ok(response) => response,
        Err(e) => {
            log::error!("Could not build response: {e}");
            plain_response(Status::INTERNAL_SERVER_ERROR)
        }
    }
}

fn status_code(status: Status) -> StatusCode {
    StatusCode::from_u16(status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn plain_response(status: Status) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status_code(status);
    response
}
