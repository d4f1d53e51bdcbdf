pub mod delivery;
pub mod error;
pub mod failure_log;
pub mod http;

pub use delivery::{RetryPolicy, deliver_with_retry};
pub use error::SinkError;
pub use failure_log::{FailureEntry, FailureLog};
pub use http::{HttpRecordSink, RecordSubmitter};
