// src/session/controller.rs
//! Per-session view state machine: Input -> Analyzing -> Results / Input

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::state::{Mode, ViewState};
use crate::assessment::{AssessmentRequest, AssessmentResult, AssessmentService, ProfileImage};
use crate::errors::{ClientError, ExportError, ValidationError, ANALYSIS_FAILED_MESSAGE};
use crate::export::{ExportedDocument, Exporter};
use crate::validator::HostMatching;

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another operation is in flight, or results are showing; nothing changed
    Ignored,
    Rejected(ValidationError),
    Completed(AssessmentResult),
    Failed(ClientError),
}

#[derive(Debug)]
pub enum ExportOutcome {
    Ignored,
    Completed(ExportedDocument),
    Failed(ExportError),
}

struct Inner {
    view: ViewState,
    in_flight: Option<CancellationToken>,
}

pub struct SessionController {
    service: Arc<dyn AssessmentService>,
    host_matching: HostMatching,
    inner: Arc<Mutex<Inner>>,
}

impl SessionController {
    pub fn new(service: Arc<dyn AssessmentService>, host_matching: HostMatching) -> Self {
        Self {
            service,
            host_matching,
            inner: Arc::new(Mutex::new(Inner {
                view: ViewState::default(),
                in_flight: None,
            })),
        }
    }

    pub async fn view(&self) -> ViewState {
        self.inner.lock().await.view.clone()
    }

    pub async fn set_draft_url(&self, url: &str) {
        let mut inner = self.inner.lock().await;
        if inner.view.mode == Mode::Input {
            inner.view.draft.profile_url = url.to_string();
        }
    }

    /// Replaces any previously selected screenshot
    pub async fn attach_image(&self, image: ProfileImage) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.view.mode != Mode::Input {
            return false;
        }
        inner.view.draft.image = Some(image);
        true
    }

    pub async fn clear_image(&self) {
        let mut inner = self.inner.lock().await;
        if inner.view.mode == Mode::Input {
            inner.view.draft.image = None;
        }
    }

    /// Show an intake error (e.g. a rejected screenshot) without calling the service
    pub async fn reject(&self, url: &str, error: ValidationError) -> SubmitOutcome {
        let mut inner = self.inner.lock().await;
        if inner.view.mode != Mode::Input || inner.view.exporting {
            return SubmitOutcome::Ignored;
        }
        inner.view.draft.profile_url = url.to_string();
        inner.view.last_error = Some(error.to_string());
        SubmitOutcome::Rejected(error)
    }

    pub async fn submit(&self, url: &str, image: Option<ProfileImage>) -> SubmitOutcome {
        let (request, token) = {
            let mut inner = self.inner.lock().await;
            let view = &mut inner.view;

            if view.mode != Mode::Input || view.exporting {
                warn!("Submit ignored while session is {:?}", view.mode);
                return SubmitOutcome::Ignored;
            }

            view.draft.profile_url = url.to_string();
            if let Some(image) = image {
                view.draft.image = Some(image);
            }

            let url = url.trim();
            let rejection = if url.is_empty() {
                Some(ValidationError::EmptyUrl)
            } else if !self.host_matching.accepts(url) {
                Some(ValidationError::InvalidUrl)
            } else {
                None
            };

            if let Some(rejection) = rejection {
                view.last_error = Some(rejection.to_string());
                return SubmitOutcome::Rejected(rejection);
            }

            view.mode = Mode::Analyzing;
            view.last_error = None;

            let request = AssessmentRequest {
                profile_url: url.to_string(),
                image: view.draft.image.clone(),
            };
            let token = CancellationToken::new();
            inner.in_flight = Some(token.clone());
            (request, token)
        };

        info!("Analyzing profile {}", request.profile_url);

        // The call settles the view on its own task. A caller that goes away
        // cancels it rather than leaving the session in Analyzing.
        let abandon = token.clone().drop_guard();
        let task = tokio::spawn(run_analysis(
            self.service.clone(),
            self.inner.clone(),
            request,
            token,
        ));
        let joined = task.await;
        abandon.disarm();

        match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Analysis task aborted: {}", e);
                let mut inner = self.inner.lock().await;
                inner.in_flight = None;
                inner.view.mode = Mode::Input;
                inner.view.last_error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                SubmitOutcome::Failed(ClientError::Unreachable(e.to_string()))
            }
        }
    }

    /// Abort the in-flight analysis, if any
    pub async fn cancel(&self) -> bool {
        match self.inner.lock().await.in_flight.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Back to an empty input form. Refused while an analysis or export is running.
    pub async fn reset(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.view.mode == Mode::Analyzing || inner.view.exporting {
            return false;
        }
        inner.view = ViewState::default();
        true
    }

    /// Consumes the pending scroll-into-view request
    pub async fn take_scroll_request(&self) -> bool {
        std::mem::take(&mut self.inner.lock().await.view.scroll_to_results)
    }

    pub async fn export_requested(&self, exporter: Arc<Exporter>) -> ExportOutcome {
        let result = {
            let mut inner = self.inner.lock().await;
            let view = &mut inner.view;
            if view.mode != Mode::Results || view.exporting {
                return ExportOutcome::Ignored;
            }
            let Some(result) = view.last_result.clone() else {
                return ExportOutcome::Ignored;
            };
            view.exporting = true;
            result
        };

        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let outcome = exporter.export(&result).await;
            inner.lock().await.view.exporting = false;
            outcome
        });

        match task.await {
            Ok(Ok(document)) => ExportOutcome::Completed(document),
            Ok(Err(e)) => {
                error!("Export failed: {}", e);
                ExportOutcome::Failed(e)
            }
            Err(e) => {
                error!("Export task aborted: {}", e);
                self.inner.lock().await.view.exporting = false;
                ExportOutcome::Failed(ExportError::Render(e.to_string()))
            }
        }
    }
}

async fn run_analysis(
    service: Arc<dyn AssessmentService>,
    inner: Arc<Mutex<Inner>>,
    request: AssessmentRequest,
    token: CancellationToken,
) -> SubmitOutcome {
    let outcome = service.analyze(&request, &token).await;

    let mut inner = inner.lock().await;
    inner.in_flight = None;
    let view = &mut inner.view;

    match outcome {
        Ok(result) => {
            view.last_result = Some(result.clone());
            view.mode = Mode::Results;
            view.scroll_to_results = true;
            SubmitOutcome::Completed(result)
        }
        Err(ClientError::Cancelled) => {
            view.mode = Mode::Input;
            SubmitOutcome::Failed(ClientError::Cancelled)
        }
        Err(e) => {
            error!("Assessment of {} failed: {}", request.profile_url, e);
            view.last_error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
            view.mode = Mode::Input;
            SubmitOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::types::fixtures::sample_result;
    use crate::export::DocumentRenderer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct FakeService {
        calls: AtomicUsize,
        response: Result<AssessmentResult, ClientError>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeService {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Ok(sample_result()),
                gate: None,
            })
        }

        fn failing(error: ClientError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Err(error),
                gate: None,
            })
        }

        fn gated(gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Ok(sample_result()),
                gate: Some(gate),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssessmentService for FakeService {
        async fn analyze(
            &self,
            _request: &AssessmentRequest,
            cancel: &CancellationToken,
        ) -> Result<AssessmentResult, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                tokio::select! {
                    _ = gate.notified() => {}
                    _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                }
            }
            self.response.clone()
        }
    }

    struct StaticRenderer(Result<Vec<u8>, ExportError>);

    #[async_trait]
    impl DocumentRenderer for StaticRenderer {
        async fn render(&self, _source: &str) -> Result<Vec<u8>, ExportError> {
            self.0.clone()
        }
    }

    /// Holds the compile until the gate opens
    struct GatedRenderer(Arc<Notify>);

    #[async_trait]
    impl DocumentRenderer for GatedRenderer {
        async fn render(&self, _source: &str) -> Result<Vec<u8>, ExportError> {
            self.0.notified().await;
            Ok(b"%PDF".to_vec())
        }
    }

    fn exporter(result: Result<Vec<u8>, ExportError>) -> Arc<Exporter> {
        Arc::new(Exporter::new(Box::new(StaticRenderer(result)), "Report"))
    }

    fn gated_exporter(gate: Arc<Notify>) -> Arc<Exporter> {
        Arc::new(Exporter::new(Box::new(GatedRenderer(gate)), "Report"))
    }

    const URL: &str = "https://www.linkedin.com/in/jane-doe";

    #[tokio::test]
    async fn test_blank_url_never_calls_service() {
        let service = FakeService::ok();
        let controller = SessionController::new(service.clone(), HostMatching::Substring);

        for blank in ["", "   ", "\t\n"] {
            let outcome = controller.submit(blank, None).await;
            assert!(matches!(
                outcome,
                SubmitOutcome::Rejected(ValidationError::EmptyUrl)
            ));
        }

        let view = controller.view().await;
        assert_eq!(service.calls(), 0);
        assert_eq!(view.mode, Mode::Input);
        assert_eq!(
            view.last_error.as_deref(),
            Some("Please enter a LinkedIn profile URL.")
        );
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let service = FakeService::ok();
        let controller = SessionController::new(service.clone(), HostMatching::Substring);

        let outcome = controller.submit("https://example.com", None).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::InvalidUrl)
        ));
        assert_eq!(service.calls(), 0);
        assert_eq!(controller.view().await.draft.profile_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_strict_matching_rejects_lookalike_host() {
        let service = FakeService::ok();
        let controller = SessionController::new(service.clone(), HostMatching::Strict);
        let outcome = controller
            .submit("https://linkedin.com.evil.example/in/x", None)
            .await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_stores_result_unchanged() {
        let service = FakeService::ok();
        let controller = SessionController::new(service.clone(), HostMatching::Substring);

        let outcome = controller.submit(URL, None).await;
        assert!(matches!(outcome, SubmitOutcome::Completed(_)));

        let view = controller.view().await;
        assert_eq!(view.mode, Mode::Results);
        assert_eq!(view.last_result, Some(sample_result()));
        assert!(view.last_error.is_none());
        assert_eq!(service.calls(), 1);

        assert!(controller.take_scroll_request().await);
        assert!(!controller.take_scroll_request().await);
    }

    #[tokio::test]
    async fn test_malformed_response_returns_to_input() {
        let service = FakeService::failing(ClientError::MalformedResponse("no riskScore".into()));
        let controller = SessionController::new(service, HostMatching::Substring);

        let outcome = controller.submit(URL, None).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.is_malformed()));

        let view = controller.view().await;
        assert_eq!(view.mode, Mode::Input);
        assert!(view.last_result.is_none());
        assert_eq!(view.last_error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_noop() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::gated(gate.clone());
        let controller = Arc::new(SessionController::new(
            service.clone(),
            HostMatching::Substring,
        ));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(URL, None).await })
        };

        while !controller.view().await.analyzing() {
            tokio::task::yield_now().await;
        }

        let second = controller.submit(URL, None).await;
        assert!(matches!(second, SubmitOutcome::Ignored));
        assert!(!controller.reset().await);

        gate.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, SubmitOutcome::Completed(_)));
        assert_eq!(service.calls(), 1);
        assert_eq!(controller.view().await.mode, Mode::Results);
    }

    #[tokio::test]
    async fn test_cancel_in_flight() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::gated(gate);
        let controller = Arc::new(SessionController::new(service, HostMatching::Substring));

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(URL, None).await })
        };
        while !controller.view().await.analyzing() {
            tokio::task::yield_now().await;
        }

        assert!(controller.cancel().await);
        let outcome = pending.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed(ClientError::Cancelled)));
        let view = controller.view().await;
        assert_eq!(view.mode, Mode::Input);
        assert!(view.last_error.is_none());
        assert!(!controller.cancel().await);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let controller = SessionController::new(FakeService::ok(), HostMatching::Substring);
        controller
            .attach_image(ProfileImage {
                mime_type: "image/png".into(),
                data: vec![1],
            })
            .await;
        controller.submit(URL, None).await;

        assert!(controller.reset().await);
        let view = controller.view().await;
        assert_eq!(view, ViewState::default());

        // idempotent from Input, including after an error
        controller.submit("nope", None).await;
        assert!(controller.reset().await);
        assert_eq!(controller.view().await, ViewState::default());
    }

    #[tokio::test]
    async fn test_new_image_replaces_previous() {
        let service = FakeService::failing(ClientError::Unreachable("down".into()));
        let controller = SessionController::new(service, HostMatching::Substring);
        let first = ProfileImage {
            mime_type: "image/png".into(),
            data: vec![1],
        };
        let second = ProfileImage {
            mime_type: "image/jpeg".into(),
            data: vec![2],
        };

        controller.attach_image(first).await;
        controller.submit(URL, Some(second.clone())).await;
        assert_eq!(controller.view().await.draft.image, Some(second));
    }

    #[tokio::test]
    async fn test_export_only_from_results() {
        let controller = SessionController::new(FakeService::ok(), HostMatching::Substring);
        let exporter = exporter(Ok(b"%PDF".to_vec()));

        assert!(matches!(
            controller.export_requested(exporter.clone()).await,
            ExportOutcome::Ignored
        ));

        controller.submit(URL, None).await;
        match controller.export_requested(exporter.clone()).await {
            ExportOutcome::Completed(doc) => assert_eq!(doc.filename, "Report-Jane-Doe.pdf"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!controller.view().await.exporting);
    }

    #[tokio::test]
    async fn test_export_failure_keeps_result_and_error_banner() {
        let controller = SessionController::new(FakeService::ok(), HostMatching::Substring);
        controller.submit(URL, None).await;

        let exporter = exporter(Err(ExportError::Render("boom".into())));
        assert!(matches!(
            controller.export_requested(exporter.clone()).await,
            ExportOutcome::Failed(_)
        ));

        let view = controller.view().await;
        assert!(!view.exporting);
        assert!(view.last_error.is_none());
        assert_eq!(view.last_result, Some(sample_result()));
        assert_eq!(view.mode, Mode::Results);
    }

    #[tokio::test]
    async fn test_dropped_submit_does_not_strand_session() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::gated(gate);
        let controller = SessionController::new(service.clone(), HostMatching::Substring);

        let dropped =
            tokio::time::timeout(Duration::from_millis(50), controller.submit(URL, None)).await;
        assert!(dropped.is_err());

        while controller.view().await.analyzing() {
            tokio::task::yield_now().await;
        }

        let view = controller.view().await;
        assert_eq!(view.mode, Mode::Input);
        assert!(view.last_error.is_none());
        assert!(!controller.cancel().await);
        assert!(controller.reset().await);
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_export_is_noop_and_blocks_reset() {
        let controller = Arc::new(SessionController::new(
            FakeService::ok(),
            HostMatching::Substring,
        ));
        controller.submit(URL, None).await;

        let gate = Arc::new(Notify::new());
        let exporter = gated_exporter(gate.clone());
        let first = {
            let controller = controller.clone();
            let exporter = exporter.clone();
            tokio::spawn(async move { controller.export_requested(exporter).await })
        };

        while !controller.view().await.exporting {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            controller.export_requested(exporter.clone()).await,
            ExportOutcome::Ignored
        ));
        assert!(!controller.reset().await);
        assert!(matches!(
            controller.submit(URL, None).await,
            SubmitOutcome::Ignored
        ));

        gate.notify_one();
        assert!(matches!(
            first.await.unwrap(),
            ExportOutcome::Completed(_)
        ));

        let view = controller.view().await;
        assert!(!view.exporting);
        assert_eq!(view.mode, Mode::Results);
        assert!(controller.reset().await);
    }

    #[tokio::test]
    async fn test_dropped_export_still_clears_flag() {
        let controller = SessionController::new(FakeService::ok(), HostMatching::Substring);
        controller.submit(URL, None).await;

        let gate = Arc::new(Notify::new());
        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            controller.export_requested(gated_exporter(gate.clone())),
        )
        .await;
        assert!(dropped.is_err());
        assert!(controller.view().await.exporting);

        gate.notify_one();
        while controller.view().await.exporting {
            tokio::task::yield_now().await;
        }
        assert!(controller.reset().await);
    }
}
