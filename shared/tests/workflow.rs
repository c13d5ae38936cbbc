use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use rand::Rng;
use serde_json::{Value, json};
use shared::{
    DetectionError, FailureKind, RawResponse, ResponseNormalizer, StateTag, UploadTransport,
    UploadedFile, WorkflowController, WorkflowState,
};
use tokio::sync::oneshot;

const IMAGE: &str = "/9j/4AAQSkZJRgABAQ==";

/// Transport whose replies are queued up front, in call order.
#[derive(Default)]
struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<RawResponse, DetectionError>>>,
    calls: Cell<usize>,
}

impl ScriptedTransport {
    fn reply(self, outcome: Result<RawResponse, DetectionError>) -> Self {
        self.replies.borrow_mut().push_back(outcome);
        self
    }
}

impl<S> UploadTransport<S> for ScriptedTransport {
    async fn upload(&self, _file: &UploadedFile<S>) -> Result<RawResponse, DetectionError> {
        self.calls.set(self.calls.get() + 1);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(DetectionError::NetworkFailure("no scripted reply".into())))
    }
}

/// Transport that suspends until the test releases the matching file's reply.
#[derive(Default)]
struct GatedTransport {
    gates: RefCell<Vec<(String, oneshot::Receiver<Result<RawResponse, DetectionError>>)>>,
}

impl GatedTransport {
    fn gate(&self, name: &str) -> oneshot::Sender<Result<RawResponse, DetectionError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push((name.to_string(), rx));
        tx
    }
}

impl<S> UploadTransport<S> for GatedTransport {
    async fn upload(&self, file: &UploadedFile<S>) -> Result<RawResponse, DetectionError> {
        let rx = {
            let mut gates = self.gates.borrow_mut();
            let index = gates
                .iter()
                .position(|(name, _)| name == file.name())
                .expect("gate registered for file");
            gates.remove(index).1
        };
        rx.await
            .unwrap_or_else(|_| Err(DetectionError::NetworkFailure("gate dropped".into())))
    }
}

fn detections(confidences: &[f64]) -> Value {
    let entries: Vec<Value> = confidences
        .iter()
        .map(|c| json!({ "confidence": c }))
        .collect();
    json!({ "status": "success", "detections": entries, "annotated_image": IMAGE })
}

fn image(name: &str) -> UploadedFile<Vec<u8>> {
    UploadedFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
}

#[tokio::test]
async fn two_detections_average_to_point_eight() {
    let transport = ScriptedTransport::default().reply(Ok(detections(&[0.9, 0.7])));
    let mut controller = WorkflowController::default();

    let ticket = controller.submit(image("f1.jpg"));
    let completion = ticket.exchange(&transport).await;
    assert!(controller.complete(completion));

    let result = controller.state().result().expect("succeeded");
    assert_eq!(result.count(), 2);
    assert!((result.confidence() - 0.8).abs() < 1e-9);
    assert_eq!(transport.calls.get(), 1);
}

#[tokio::test]
async fn server_error_fails_then_resubmission_clears_it() {
    let transport = ScriptedTransport::default().reply(Err(DetectionError::ServerRejected {
        status: 500,
        detail: "Internal Server Error".into(),
    }));
    let mut controller = WorkflowController::default();

    let completion = controller.submit(image("f2.jpg")).exchange(&transport).await;
    controller.complete(completion);

    let failure = controller.state().failure().expect("failed");
    assert_eq!(failure.kind, FailureKind::ServerRejected);
    assert_eq!(failure.kind.to_string(), "ServerRejected");

    controller.submit(image("f3.jpg"));
    assert_eq!(controller.state().tag(), StateTag::Uploading);
    assert_eq!(controller.state().uploading().unwrap().name(), "f3.jpg");
    assert!(controller.state().failure().is_none());
}

#[tokio::test]
async fn empty_detections_succeed_with_zero_confidence() {
    let transport = ScriptedTransport::default().reply(Ok(detections(&[])));
    let mut controller = WorkflowController::default();

    let completion = controller.submit(image("f4.jpg")).exchange(&transport).await;
    controller.complete(completion);

    let result = controller.state().result().expect("succeeded");
    assert_eq!(result.count(), 0);
    assert_eq!(result.confidence(), 0.0);
}

#[tokio::test]
async fn later_submission_wins_when_earlier_reply_arrives_last() {
    let transport = GatedTransport::default();
    let release_a = transport.gate("a.jpg");
    let release_b = transport.gate("b.jpg");
    let controller = RefCell::new(WorkflowController::default());

    let ticket_a = controller.borrow_mut().submit(image("a.jpg"));
    let ticket_b = controller.borrow_mut().submit(image("b.jpg"));

    let run_a = async {
        let completion = ticket_a.exchange(&transport).await;
        controller.borrow_mut().complete(completion)
    };
    let run_b = async {
        let completion = ticket_b.exchange(&transport).await;
        controller.borrow_mut().complete(completion)
    };
    let release = async {
        tokio::task::yield_now().await;
        release_b.send(Ok(detections(&[0.2]))).unwrap();
        tokio::task::yield_now().await;
        release_a.send(Ok(detections(&[0.9, 0.9]))).unwrap();
    };

    let (applied_a, applied_b, ()) = tokio::join!(run_a, run_b, release);
    assert!(!applied_a);
    assert!(applied_b);

    let state = controller.borrow();
    let result = state.state().result().expect("b succeeded");
    assert_eq!(result.count(), 1);
    assert!((result.confidence() - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn stale_failure_does_not_replace_newer_upload() {
    let transport = ScriptedTransport::default()
        .reply(Err(DetectionError::NetworkFailure("connection reset".into())));
    let mut controller = WorkflowController::default();

    let stale = controller.submit(image("a.jpg"));
    controller.submit(image("b.jpg"));

    let completion = stale.exchange(&transport).await;
    assert!(!controller.complete(completion));
    assert!(matches!(controller.state(), WorkflowState::Uploading(f) if f.name() == "b.jpg"));
}

struct TrackedPreview(Rc<Cell<usize>>);

impl Drop for TrackedPreview {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[tokio::test]
async fn superseded_file_releases_its_preview() {
    let released = Rc::new(Cell::new(0));
    let transport = ScriptedTransport::default().reply(Ok(detections(&[0.5])));
    let mut controller = WorkflowController::default();

    let first = UploadedFile::new("a.jpg", "image/jpeg", TrackedPreview(Rc::clone(&released)));
    let completion = controller.submit(first).exchange(&transport).await;
    controller.complete(completion);
    assert_eq!(released.get(), 1, "leaving Uploading drops the file");

    let second = UploadedFile::new("b.jpg", "image/jpeg", TrackedPreview(Rc::clone(&released)));
    let third = UploadedFile::new("c.jpg", "image/jpeg", TrackedPreview(Rc::clone(&released)));
    drop(controller.submit(second));
    drop(controller.submit(third));
    assert_eq!(released.get(), 2, "superseding an upload drops the older file");
}

#[tokio::test]
async fn confidence_is_the_mean_of_random_sequences() {
    let mut rng = rand::rng();
    let normalizer = ResponseNormalizer::default();
    for _ in 0..200 {
        let len = rng.random_range(1..40);
        let values: Vec<f64> = (0..len).map(|_| rng.random_range(0.0..=1.0)).collect();
        let expected = values.iter().sum::<f64>() / values.len() as f64;

        let result = normalizer.normalize(&detections(&values)).unwrap();
        assert_eq!(result.count(), values.len());
        assert!((result.confidence() - expected).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&result.confidence()));
    }
}
