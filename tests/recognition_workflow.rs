use serde_json::json;
use sketch_calc::draw::capture::decode_png_base64;
use sketch_calc::draw::{alpha_bounds, Color, Point, Position};
use sketch_calc::recognize::{
    RecognitionError, RecognitionRequest, RecognitionService, ResultRecord, SubmissionWorker,
    SubmitError,
};
use sketch_calc::session::{Session, SubmitOutcome, SubmitStatus, DEFAULT_POSITION};
use sketch_calc::settings::Settings;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers `2+2` and remembers what it was sent.
#[derive(Default)]
struct Calculator {
    seen: Mutex<Vec<RecognitionRequest>>,
}

impl RecognitionService for Calculator {
    fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<ResultRecord>, RecognitionError> {
        self.seen.lock().expect("seen lock").push(request.clone());
        Ok(vec![ResultRecord::new("2+2", 4)])
    }
}

struct Offline;

impl RecognitionService for Offline {
    fn recognize(
        &self,
        _request: &RecognitionRequest,
    ) -> Result<Vec<ResultRecord>, RecognitionError> {
        Err(RecognitionError::Transport("network unreachable".into()))
    }
}

fn session() -> Session {
    Session::new(&Settings {
        canvas_width: 120,
        canvas_height: 90,
        ..Settings::default()
    })
}

#[test]
fn submitted_image_is_the_drawn_raster() {
    let mut session = session();
    session.select_color(Color::rgb(0x22, 0x8B, 0xE6));
    session.begin_stroke(Point::new(30, 30));
    session.extend_stroke(Point::new(60, 45));
    session.end_stroke();
    let expected_bounds = alpha_bounds(session.surface().buffer());

    let service = Calculator::default();
    session.submit(&service).expect("submit");

    let seen = service.seen.lock().expect("seen lock");
    let decoded = decode_png_base64(&seen[0].image).expect("png payload");
    assert_eq!((decoded.width, decoded.height), (120, 90));
    assert_eq!(alpha_bounds(&decoded), expected_bounds);
    assert_eq!(decoded.pixel(45, 37), Color::rgb(0x22, 0x8B, 0xE6));
}

#[test]
fn reset_then_capture_is_fully_transparent() {
    let mut session = session();
    session.begin_stroke(Point::new(0, 0));
    session.extend_stroke(Point::new(119, 89));
    session.end_stroke();

    session.reset();

    let captured = session.surface().capture_image().expect("capture");
    let decoded = decode_png_base64(&captured).expect("decode");
    assert_eq!(decoded.opaque_pixel_count(), 0);
}

#[test]
fn worker_round_trip_applies_results_on_owner_thread() {
    let mut session = session();
    session.begin_stroke(Point::new(10, 10));
    session.extend_stroke(Point::new(20, 20));
    session.end_stroke();
    let mut worker = SubmissionWorker::new(Arc::new(Calculator::default()));

    let pending = session.begin_submit().expect("begin");
    worker.dispatch(pending);
    assert!(session.is_busy());
    assert_eq!(session.begin_submit(), Err(SubmitError::Busy));

    let done = worker.wait(Duration::from_secs(5)).expect("completion");
    let outcome = session.complete_submit(done);

    assert!(matches!(outcome, SubmitOutcome::Applied { annotations: 1, .. }));
    assert_eq!(session.annotations()[0].text, "2+2 = 4");
    assert_eq!(session.status(), &SubmitStatus::Succeeded { annotations: 1 });
}

#[test]
fn reset_while_worker_is_running_drops_the_late_answer() {
    let mut session = session();
    let mut worker = SubmissionWorker::new(Arc::new(Calculator::default()));

    worker.dispatch(session.begin_submit().expect("begin"));
    session.reset();
    // Still counted, so the app keeps Generate disabled until it is drained.
    assert_eq!(worker.in_flight(), 1);
    let done = worker.wait(Duration::from_secs(5)).expect("completion");

    assert_eq!(session.complete_submit(done), SubmitOutcome::Stale);
    assert_eq!(worker.in_flight(), 0);
    assert!(session.annotations().is_empty());
    assert_eq!(session.next_position(), DEFAULT_POSITION);
}

#[test]
fn offline_service_leaves_session_usable() {
    let mut session = session();
    session.begin_stroke(Point::new(5, 5));
    session.extend_stroke(Point::new(9, 9));
    session.end_stroke();

    let outcome = session.submit(&Offline).expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(!session.is_busy());

    // The drawing is still there to retry with.
    let outcome = session.submit(&Calculator::default()).expect("retry");
    assert!(matches!(outcome, SubmitOutcome::Applied { annotations: 1, .. }));
}

#[test]
fn variables_accumulate_across_submissions_until_reset() {
    struct Assigner(Mutex<u32>);

    impl RecognitionService for Assigner {
        fn recognize(
            &self,
            request: &RecognitionRequest,
        ) -> Result<Vec<ResultRecord>, RecognitionError> {
            let mut n = self.0.lock().expect("counter lock");
            *n += 1;
            let name = format!("v{n}");
            assert_eq!(request.dict_of_vars.len() as u32, *n - 1);
            Ok(vec![ResultRecord::new(format!("{name} = {n}"), *n).assignment()])
        }
    }

    let mut session = session();
    let service = Assigner(Mutex::new(0));
    for _ in 0..3 {
        session.submit(&service).expect("submit");
    }
    assert_eq!(session.symbols().len(), 3);
    assert_eq!(session.symbols().get("v2"), Some(&json!(2)));
    let texts: Vec<_> = session.annotations().iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, ["v1 = 1 = 1", "v2 = 2 = 2", "v3 = 3 = 3"]);

    session.reset();
    assert!(session.symbols().is_empty());
    assert_eq!(session.next_position(), Position::new(10.0, 200.0));
}
