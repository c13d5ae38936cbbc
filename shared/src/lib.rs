pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod splash;
pub mod transport;

pub use config::ClientConfig;
pub use controller::{Completion, SubmissionId, Ticket, WorkflowController};
pub use error::{DetectionError, Failure, FailureKind};
pub use model::{AnnotatedImage, DetectionResult, RawDetection, StateTag, UploadedFile, WorkflowState};
pub use normalizer::ResponseNormalizer;
pub use transport::{RawResponse, UploadTransport};
