pub mod config;
pub mod error;
pub mod kernel;
pub mod services;

// Re-export specific items for convenient access
pub use config::ClientConfig;
pub use kernel::analytics::{AnalyticsDeriver, ClassifiedFeedback};
pub use kernel::registry::PresentationRegistry;
pub use kernel::session::Session;
pub use services::backend::{Backend, HttpBackend};
pub use services::poller::JobStatusPoller;
pub use services::upload::{AudioArtifact, UploadCoordinator};
