//! Request-scoped context
//!
//! Every trait method receives a `Context` as its first parameter. It
//! carries a request id used to correlate log lines of a single host call.

use uuid::Uuid;

#[derive(Clone)]
pub struct Context {
    request_id: Uuid,
}

impl Context {
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Span for one operation on one type, e.g. `("read", "aws_cur_report_definition")`.
    /// Attach it with `tracing::Instrument` rather than entering it across awaits.
    pub fn span(&self, operation: &'static str, type_name: &str) -> tracing::Span {
        tracing::info_span!(
            "tfplug",
            request_id = %self.request_id,
            operation,
            type_name
        )
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .finish()
    }
}
