//! Request correlation headers for calls to the document and news backends.

use opentelemetry::trace::TraceContextExt;
use reqwest::header::HeaderMap;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Insert a fresh request id and, inside a valid OpenTelemetry span, a `traceparent`.
pub fn inject_trace_headers(headers: &mut HeaderMap) {
    if let Ok(value) = Uuid::new_v4().to_string().parse() {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    let context = Span::current().context();
    let span_context = context.span().span_context().clone();
    if !span_context.is_valid() {
        return;
    }

    // version-trace_id-span_id-trace_flags
    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = traceparent.parse() {
        headers.insert(TRACEPARENT_HEADER, value);
    }
}

/// `reqwest::Client` helpers that attach correlation headers to every request.
pub trait TracedClientExt {
    fn traced_get(&self, url: &str) -> reqwest::RequestBuilder;
    fn traced_post(&self, url: &str) -> reqwest::RequestBuilder;
    fn traced_delete(&self, url: &str) -> reqwest::RequestBuilder;
}

impl TracedClientExt for reqwest::Client {
    fn traced_get(&self, url: &str) -> reqwest::RequestBuilder {
        with_trace_headers(self.get(url))
    }

    fn traced_post(&self, url: &str) -> reqwest::RequestBuilder {
        with_trace_headers(self.post(url))
    }

    fn traced_delete(&self, url: &str) -> reqwest::RequestBuilder {
        with_trace_headers(self.delete(url))
    }
}

fn with_trace_headers(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    let mut headers = HeaderMap::new();
    inject_trace_headers(&mut headers);
    request.headers(headers)
}
