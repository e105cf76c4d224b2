//! Streamable hosting: authenticated upload and processing-status polling.

pub mod credentials;
pub mod poller;
pub mod streamable;
pub mod upload;

pub use credentials::HostingCredentials;
pub use poller::{PollConfig, ProcessingStatus};
pub use streamable::StreamableClient;
pub use upload::UploadResult;
