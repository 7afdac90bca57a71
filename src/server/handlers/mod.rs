//! HTTP request handlers for the web server.

mod home;
mod receipts;

// Re-export handlers for use by the router
pub use home::home;
pub use receipts::scan_receipt;
