//! Readiness endpoint.

/// Plain-text readiness string.
pub async fn home() -> &'static str {
    "Receipt Scanner API is running."
}
