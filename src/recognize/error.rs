use thiserror::Error;

/// Failures reaching or understanding the recognition service.
///
/// A record flagged `error: true` inside a well-formed response is not one
/// of these; it only means nothing usable was recognized for that element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("could not reach recognition service: {0}")]
    Transport(String),
    #[error("recognition service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response from recognition service: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a recognition request is already in flight")]
    Busy,
    #[error("could not capture the drawing: {0}")]
    Capture(String),
}
