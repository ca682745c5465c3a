use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const MAX_CORRELATION_ID_LEN: usize = 128;

/// Correlation id of the current request, available as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reuses a well-formed incoming correlation id or generates a fresh one.
pub fn extract_or_generate(headers: &HeaderMap) -> CorrelationId {
    match headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
    {
        Some(id) if is_valid(id) => {
            tracing::debug!(correlation_id = %id, "Using correlation id from request");
            CorrelationId(id.to_string())
        }
        Some(id) if !id.is_empty() => {
            tracing::warn!(correlation_id = %id, "Invalid correlation id format, generating a new one");
            CorrelationId(Uuid::new_v4().to_string())
        }
        _ => CorrelationId(Uuid::new_v4().to_string()),
    }
}

fn is_valid(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CORRELATION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Clone, Default)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdService { inner }
    }
}

#[derive(Clone)]
pub struct CorrelationIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorrelationIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = CorrelationIdFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let correlation_id = extract_or_generate(request.headers());
        let span = tracing::info_span!("request", correlation_id = %correlation_id.as_str());
        let header = HeaderValue::from_str(correlation_id.as_str()).ok();
        request.extensions_mut().insert(correlation_id);

        let future = {
            let _entered = span.enter();
            self.inner.call(request)
        };

        CorrelationIdFuture {
            future,
            span,
            header,
        }
    }
}

#[pin_project::pin_project]
pub struct CorrelationIdFuture<F> {
    #[pin]
    future: F,
    span: tracing::Span,
    header: Option<HeaderValue>,
}

impl<F, ResBody, E> std::future::Future for CorrelationIdFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _entered = this.span.enter();

        match this.future.poll(cx) {
            Poll::Ready(Ok(mut response)) => {
                if let Some(value) = this.header.take() {
                    response
                        .headers_mut()
                        .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
                }
                Poll::Ready(Ok(response))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_reuses_valid_incoming_id() {
        let id = extract_or_generate(&headers_with("abc-123_XYZ"));
        assert_eq!(id.as_str(), "abc-123_XYZ");
    }

    #[test]
    fn test_replaces_malformed_id() {
        let id = extract_or_generate(&headers_with("not valid!"));
        assert_ne!(id.as_str(), "not valid!");
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_generates_when_missing() {
        let id = extract_or_generate(&HeaderMap::new());
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_rejects_overlong_id() {
        let long = "a".repeat(MAX_CORRELATION_ID_LEN + 1);
        let id = extract_or_generate(&headers_with(&long));
        assert_ne!(id.as_str(), long);
    }
}
