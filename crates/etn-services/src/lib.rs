//! etn Services Layer
//!
//! The two operations of the image share: `Uploader` turns a file into a shareable
//! link, `Viewer` turns a link's id back into image bytes. Both run against an
//! injected `Backend`; when none could be initialized they report the service as
//! unavailable instead of failing at startup. Keep HTTP handling in etn-api.

pub mod backend;
pub mod retry;
pub mod status;
pub mod upload;
pub mod view;

pub use backend::Backend;
pub use retry::{with_retry, RetryNotice, RetryPolicy};
pub use status::{RecordingStatusReporter, StatusReporter, TracingStatusReporter};
pub use upload::Uploader;
pub use view::Viewer;
