use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clipboard::{Clipboard, ClipboardError},
    generation::{GenerationError, GenerationService},
    models::{FormInput, GeneratedPayload, ImageUpload},
    submission::{reduce, Event, Submission},
};

/// Owns the form and the submission state and runs one generation request per submit.
pub struct SubmissionController {
    service: Arc<dyn GenerationService>,
    clipboard: Arc<dyn Clipboard>,
    form: RwLock<FormInput>,
    state: RwLock<Submission>,
}

impl SubmissionController {
    pub fn new(service: Arc<dyn GenerationService>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            service,
            clipboard,
            form: RwLock::default(),
            state: RwLock::default(),
        }
    }

    pub fn form(&self) -> FormInput {
        self.form.read().clone()
    }

    pub fn submission(&self) -> Submission {
        self.state.read().clone()
    }

    pub fn set_image(&self, image: Option<ImageUpload>) {
        self.form.write().image = image;
    }

    pub fn set_product_name(&self, product_name: impl Into<String>) {
        self.form.write().product_name = product_name.into();
    }

    pub fn set_keywords(&self, keywords: impl Into<String>) {
        self.form.write().keywords = keywords.into();
    }

    fn apply(&self, event: Event) -> Submission {
        let mut guard = self.state.write();
        let next = reduce(&guard, event);
        *guard = next.clone();
        next
    }

    /// Runs one attempt for `form` and returns the state after it settles.
    pub async fn submit(&self, form: FormInput) -> Submission {
        let request_id = Uuid::new_v4();
        let started = self.apply(Event::Started { request_id });
        let in_flight = InFlight { controller: self, generation: started.generation, settled: false };

        let result = match &form.image {
            None => Err(GenerationError::MissingImage),
            Some(image) => {
                info!(
                    "🚀 Submission {} (generation {}) for '{}'",
                    request_id, started.generation, form.product_name
                );
                self.service.generate(image, &form.product_name, &form.keywords).await
            }
        };

        in_flight.settle(result)
    }

    pub async fn copy_to_clipboard(&self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.copy(text).await
    }
}

/// Clears Loading for its generation when dropped without settling.
struct InFlight<'a> {
    controller: &'a SubmissionController,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, result: Result<GeneratedPayload, GenerationError>) -> Submission {
        self.settled = true;
        let event = match result {
            Ok(payload) => {
                info!("✅ Generation {} succeeded", self.generation);
                Event::Succeeded { generation: self.generation, payload }
            }
            Err(e) => {
                warn!("⚠️ Generation {} failed: {}", self.generation, e);
                Event::Failed { generation: self.generation, message: e.to_string() }
            }
        };
        let next = self.controller.apply(event);
        if next.generation != self.generation {
            info!("🗑️ Discarded stale result of generation {}", self.generation);
        }
        next
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("⚠️ Generation {} dropped before completing", self.generation);
            self.controller.apply(Event::Abandoned { generation: self.generation });
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        models::GeneratedText,
        submission::{Outcome, INTERRUPTED_MESSAGE},
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };
    use tokio::sync::oneshot;

    type Reply = Result<GeneratedPayload, GenerationError>;

    pub(crate) fn bowl_payload() -> GeneratedPayload {
        GeneratedPayload {
            enhanced_image_url: "https://x/y.jpg".into(),
            generated_text: GeneratedText {
                description: "A fine bowl.".into(),
                social_post: "Check out my bowl!".into(),
                hashtags: vec!["#handmade".into(), "#wood".into()],
            },
        }
    }

    pub(crate) fn bowl_image() -> ImageUpload {
        ImageUpload {
            file_name: "bowl.jpg".into(),
            content_type: Some("image/jpeg".into()),
            data: Bytes::from_static(b"JPEGDATA"),
        }
    }

    /// Answers every call with a fresh reply built by `reply` and records the arguments.
    pub(crate) struct FakeService {
        pub calls: AtomicUsize,
        pub seen: Mutex<Vec<(String, String, String)>>,
        reply: Box<dyn Fn() -> Reply + Send + Sync>,
    }

    impl FakeService {
        pub fn new(reply: impl Fn() -> Reply + Send + Sync + 'static) -> Self {
            Self { calls: AtomicUsize::new(0), seen: Mutex::default(), reply: Box::new(reply) }
        }
    }

    #[async_trait]
    impl GenerationService for FakeService {
        async fn generate(&self, image: &ImageUpload, product_name: &str, keywords: &str) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push((
                image.file_name.clone(),
                product_name.to_string(),
                keywords.to_string(),
            ));
            (self.reply)()
        }
    }

    /// Holds each call until the test sends its reply, keyed by product name.
    struct GatedService {
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    #[async_trait]
    impl GenerationService for GatedService {
        async fn generate(&self, _image: &ImageUpload, product_name: &str, _keywords: &str) -> Reply {
            let gate = self.gates.lock().remove(product_name);
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(GenerationError::Transport("gate closed".into()))),
                None => Err(GenerationError::Transport("no gate".into())),
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingClipboard {
        pub copied: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Unavailable("no display".into()));
            }
            self.copied.lock().push(text.to_string());
            Ok(())
        }
    }

    fn controller(service: Arc<dyn GenerationService>) -> SubmissionController {
        SubmissionController::new(service, Arc::new(RecordingClipboard::default()))
    }

    fn form(product_name: &str) -> FormInput {
        FormInput { image: Some(bowl_image()), product_name: product_name.into(), keywords: String::new() }
    }

    async fn wait_for_generation(controller: &SubmissionController, generation: u64) {
        while controller.submission().generation < generation {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn missing_image_fails_without_network_call() {
        let service = Arc::new(FakeService::new(|| Ok(bowl_payload())));
        let controller = controller(service.clone());

        let state = controller.submit(FormInput::default()).await;
        assert_eq!(state.outcome, Outcome::Failure("Please select an image file.".into()));
        assert!(!state.is_loading());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_sends_one_request_with_form_fields() {
        let service = Arc::new(FakeService::new(|| Ok(bowl_payload())));
        let controller = controller(service.clone());

        let state = controller.submit(form("Wooden Bowl")).await;
        assert_eq!(state.outcome, Outcome::Success(bowl_payload()));
        assert!(!controller.submission().is_loading());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            service.seen.lock().clone(),
            vec![("bowl.jpg".to_string(), "Wooden Bowl".to_string(), String::new())]
        );
    }

    #[tokio::test]
    async fn http_failure_uses_generic_message() {
        let service = Arc::new(FakeService::new(|| {
            Err(GenerationError::Status(StatusCode::BAD_GATEWAY))
        }));
        let state = controller(service).submit(form("")).await;
        assert_eq!(
            state.outcome,
            Outcome::Failure("Failed to fetch from the server. Check your backend.".into())
        );
    }

    #[tokio::test]
    async fn transport_failure_surfaces_its_message() {
        let service = Arc::new(FakeService::new(|| {
            Err(GenerationError::Transport("connection refused".into()))
        }));
        let state = controller(service).submit(form("")).await;
        assert_eq!(state.outcome, Outcome::Failure("connection refused".into()));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn resubmit_clears_previous_error() {
        let service = Arc::new(FakeService::new(|| Ok(bowl_payload())));
        let controller = controller(service);

        let failed = controller.submit(FormInput::default()).await;
        assert!(failed.error().is_some());
        let ok = controller.submit(form("Wooden Bowl")).await;
        assert!(ok.error().is_none());
        assert_eq!(ok.generation, 2);
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_submission() {
        let (slow_tx, slow_rx) = oneshot::channel();
        let (fast_tx, fast_rx) = oneshot::channel();
        let gates = HashMap::from([("slow".to_string(), slow_rx), ("fast".to_string(), fast_rx)]);
        let controller = Arc::new(controller(Arc::new(GatedService { gates: Mutex::new(gates) })));

        let slow = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(form("slow")).await }
        });
        wait_for_generation(&controller, 1).await;

        let fast = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(form("fast")).await }
        });
        wait_for_generation(&controller, 2).await;

        fast_tx.send(Ok(bowl_payload())).unwrap();
        fast.await.unwrap();
        slow_tx.send(Err(GenerationError::Transport("late failure".into()))).unwrap();
        slow.await.unwrap();

        let state = controller.submission();
        assert_eq!(state.generation, 2);
        assert_eq!(state.outcome, Outcome::Success(bowl_payload()));
    }

    #[tokio::test]
    async fn dropped_submission_clears_loading() {
        let (_tx, rx) = oneshot::channel();
        let gates = HashMap::from([("stuck".to_string(), rx)]);
        let controller = Arc::new(controller(Arc::new(GatedService { gates: Mutex::new(gates) })));

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(form("stuck")).await }
        });
        wait_for_generation(&controller, 1).await;
        assert!(controller.submission().is_loading());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(controller.submission().outcome, Outcome::Failure(INTERRUPTED_MESSAGE.into()));
    }

    #[tokio::test]
    async fn form_values_persist() {
        let controller = controller(Arc::new(FakeService::new(|| Ok(bowl_payload()))));
        controller.set_product_name("Wooden Bowl");
        controller.set_keywords("eco-friendly");
        controller.submit(controller.form()).await;

        let form = controller.form();
        assert_eq!(form.product_name, "Wooden Bowl");
        assert_eq!(form.keywords, "eco-friendly");
        assert!(form.image.is_none());
    }

    #[tokio::test]
    async fn clipboard_result_is_returned() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let controller = SubmissionController::new(
            Arc::new(FakeService::new(|| Ok(bowl_payload()))),
            clipboard.clone(),
        );
        controller.copy_to_clipboard("#handmade #wood").await.unwrap();
        assert_eq!(clipboard.copied.lock().clone(), vec!["#handmade #wood".to_string()]);

        let failing = SubmissionController::new(
            Arc::new(FakeService::new(|| Ok(bowl_payload()))),
            Arc::new(RecordingClipboard { fail: true, ..Default::default() }),
        );
        assert!(failing.copy_to_clipboard("x").await.is_err());
    }
}
