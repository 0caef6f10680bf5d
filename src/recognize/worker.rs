use crate::recognize::client::RecognitionService;
use crate::session::{CompletedSubmission, PendingSubmission};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Runs recognition calls off the UI thread.
///
/// Each dispatched submission gets its own thread; the outcome comes back
/// over a channel and is applied by whoever owns the session, so session
/// state is only ever touched from one thread.
pub struct SubmissionWorker {
    service: Arc<dyn RecognitionService>,
    tx: Sender<CompletedSubmission>,
    rx: Receiver<CompletedSubmission>,
    notifier: Option<Notifier>,
    in_flight: usize,
}

impl SubmissionWorker {
    pub fn new(service: Arc<dyn RecognitionService>) -> Self {
        let (tx, rx) = channel();
        Self {
            service,
            tx,
            rx,
            notifier: None,
            in_flight: 0,
        }
    }

    /// Called from the worker thread after an outcome is queued, e.g. to
    /// wake an idle UI.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Dispatched submissions whose outcome has not been taken yet, stale
    /// ones included. New work should wait until this is zero.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dispatch(&mut self, pending: PendingSubmission) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let notifier = self.notifier.clone();
        self.in_flight += 1;
        std::thread::spawn(move || {
            let PendingSubmission {
                generation,
                request,
            } = pending;
            let outcome = service.recognize(&request);
            if let Err(err) = &outcome {
                tracing::warn!(generation, "recognition failed: {err}");
            }
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(CompletedSubmission {
                generation,
                outcome,
            });
            if let Some(notify) = notifier {
                notify();
            }
        });
    }

    /// Next finished submission, if any, without blocking.
    pub fn poll(&mut self) -> Option<CompletedSubmission> {
        match self.rx.try_recv() {
            Ok(done) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(done)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn wait(&mut self, timeout: Duration) -> Option<CompletedSubmission> {
        match self.rx.recv_timeout(timeout) {
            Ok(done) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(done)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
