pub mod request_log;

pub use request_log::{record_requests, DebugLog, RequestRecord};
