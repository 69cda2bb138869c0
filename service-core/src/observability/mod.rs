pub mod logging;
pub mod trace_context;

pub use logging::{init_tracing, LoggingSettings};
pub use trace_context::{inject_trace_headers, TracedClientExt, REQUEST_ID_HEADER, TRACEPARENT_HEADER};
