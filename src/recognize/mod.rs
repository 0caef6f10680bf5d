pub mod client;
pub mod error;
pub mod protocol;
pub mod worker;

pub use client::{HttpRecognitionService, RecognitionService};
pub use error::{RecognitionError, SubmitError};
pub use protocol::{RecognitionRequest, ResultRecord};
pub use worker::SubmissionWorker;
