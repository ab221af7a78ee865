//! Identifier orchestrator: the photo-to-report workflow.
//!
//! Owns the session state and drives it through
//! `Idle → ImageSelected → Identifying → ResultReady | Failed`.
//!
//! Events come in one at a time through `&mut self` methods and run to
//! completion. Two side channels complete on their own schedule:
//! - geolocation, spawned at `mount` and applied by `sync_location`
//! - the camera stream, held as a `CameraSession` that releases on drop

use crate::capture::{self, CameraDevice, CameraSession, DataUri};
use crate::error::{CaptureError, IdentifyError, PermissionError};
use crate::favorites::{FavoritesStore, StorageBackend};
use crate::geolocation::{self, Coordinates, GeolocationProvider};
use crate::llm::{self, prompts, IdentificationInput, IdentificationResult, SpeciesModel};
use image::DynamicImage;
use std::path::Path;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    ImageSelected,
    Identifying,
    ResultReady,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Upload,
    Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Advisory,
}

/// A transient message, shown once and then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

/// Everything the UI renders. Lives for one session; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub image: Option<String>,
    pub result: Option<IdentificationResult>,
    pub loading: bool,
    pub error: Option<String>,
    /// `"lat, lon"` once the geolocation lookup succeeds.
    pub location: Option<String>,
    pub location_advisory: Option<String>,
    pub camera_advisory: Option<String>,
    pub input_mode: InputMode,
}

type LocationReceiver = oneshot::Receiver<Result<Coordinates, PermissionError>>;

/// Marks the session as identifying for as long as it lives.
///
/// If the identify future is dropped before the model answers, the session
/// goes back to `ImageSelected` with loading cleared.
struct InFlight<'a> {
    state: &'a mut SessionState,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut SessionState) -> Self {
        state.loading = true;
        state.error = None;
        state.result = None;
        state.phase = Phase::Identifying;
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.loading = false;
        if self.state.phase == Phase::Identifying {
            self.state.phase = Phase::ImageSelected;
        }
    }
}

pub struct Identifier<M: SpeciesModel, B: StorageBackend> {
    model: M,
    favorites: FavoritesStore<B>,
    state: SessionState,
    camera: Option<CameraSession>,
    pending_location: Option<LocationReceiver>,
    notifications: Vec<Notification>,
}

impl<M: SpeciesModel, B: StorageBackend> Identifier<M, B> {
    pub fn new(model: M, favorites: FavoritesStore<B>) -> Self {
        Self {
            model,
            favorites,
            state: SessionState::default(),
            camera: None,
            pending_location: None,
            notifications: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn favorites(&self) -> &FavoritesStore<B> {
        &self.favorites
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Drain pending transient notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, description: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            title: title.to_string(),
            description: description.into(),
        });
    }

    // ── Geolocation ──────────────────────────────────────────────────

    /// Start the one-shot location lookup in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount<G>(&mut self, provider: G)
    where
        G: GeolocationProvider + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = provider.current_position().await;
            let _ = tx.send(outcome);
        });
        self.pending_location = Some(rx);
        log::info!("[GEO] Location lookup started");
    }

    /// Apply the lookup result if it has arrived. Does not wait.
    pub fn sync_location(&mut self) {
        let Some(rx) = self.pending_location.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending_location = None;
                self.apply_location(outcome);
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                log::warn!("[GEO] Location lookup ended without a result");
                self.pending_location = None;
            }
        }
    }

    /// Wait for the lookup started by `mount`, if any, and apply it.
    pub async fn wait_for_location(&mut self) {
        if let Some(rx) = self.pending_location.take() {
            match rx.await {
                Ok(outcome) => self.apply_location(outcome),
                Err(_) => log::warn!("[GEO] Location lookup ended without a result"),
            }
        }
    }

    fn apply_location(&mut self, outcome: Result<Coordinates, PermissionError>) {
        match outcome {
            Ok(coords) => {
                log::info!("[GEO] Location: {}", coords);
                self.state.location = Some(coords.to_string());
                self.state.location_advisory = None;
            }
            Err(e) => {
                log::warn!("[GEO] Location unavailable: {}", e);
                self.state.location_advisory = Some(geolocation::advisory_for(&e));
            }
        }
    }

    // ── Image acquisition ────────────────────────────────────────────

    /// A new image replaces the old one and clears any prior outcome.
    pub fn select_image(&mut self, image: DataUri) {
        self.state.image = Some(image.to_string());
        self.state.result = None;
        self.state.error = None;
        self.state.loading = false;
        self.state.phase = Phase::ImageSelected;
        log::info!("[PIPELINE] Image selected ({})", image.mime_type());
    }

    /// Load a picked or dropped file and select it.
    pub fn select_image_file(&mut self, path: &Path) -> Result<(), CaptureError> {
        let image = capture::load_image_file(path)?;
        self.select_image(image);
        Ok(())
    }

    /// Switch to the camera tab and open the stream.
    ///
    /// Denial is non-fatal: an advisory is set and the mode falls back to
    /// upload. Returns whether the stream is live.
    pub fn activate_camera(&mut self, device: &mut dyn CameraDevice) -> bool {
        self.camera = None;
        match CameraSession::open(device) {
            Ok(session) => {
                self.camera = Some(session);
                self.state.input_mode = InputMode::Camera;
                self.state.camera_advisory = None;
                true
            }
            Err(e) => {
                log::warn!("[CAPTURE] {}", e);
                let advisory = format!("Camera unavailable: {}. Upload a photo instead.", e);
                self.state.camera_advisory = Some(advisory.clone());
                self.state.input_mode = InputMode::Upload;
                self.notify(NotificationKind::Advisory, "Camera access denied", advisory);
                false
            }
        }
    }

    /// Leave the camera tab. The stream is released.
    pub fn deactivate_camera(&mut self) {
        self.camera = None;
        self.state.input_mode = InputMode::Upload;
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_some()
    }

    /// Current frame of the live preview.
    pub fn camera_preview(&mut self) -> Result<DynamicImage, CaptureError> {
        match self.camera.as_mut() {
            Some(session) => session.preview(),
            None => Err(CaptureError::NoActiveStream),
        }
    }

    /// Freeze the current frame into the selected image and end the stream.
    /// The stream is gone afterwards either way, so the mode returns to upload.
    pub fn capture_frame(&mut self) -> Result<(), CaptureError> {
        let session = self.camera.take().ok_or(CaptureError::NoActiveStream)?;
        self.state.input_mode = InputMode::Upload;
        let image = session.capture()?;
        self.select_image(image);
        Ok(())
    }

    // ── Identification ───────────────────────────────────────────────

    pub fn can_identify(&self) -> bool {
        self.state.image.is_some() && !self.state.loading
    }

    /// Send the selected image to the model.
    ///
    /// Outcome lands in the session state: `ResultReady` with the result,
    /// or `Failed` with a user-facing message plus an error notification.
    pub async fn identify(&mut self) -> Result<(), IdentifyError> {
        if self.state.loading {
            return Err(IdentifyError::AlreadyIdentifying);
        }
        let Some(image) = self.state.image.clone() else {
            return Err(IdentifyError::NoImageSelected);
        };

        self.sync_location();
        let location = self
            .state
            .location
            .clone()
            .unwrap_or_else(|| prompts::UNKNOWN_LOCATION.to_string());

        let start = std::time::Instant::now();
        let input = IdentificationInput {
            photo_data_uri: image,
            location: Some(location),
        };
        let outcome = {
            let _in_flight = InFlight::begin(&mut self.state);
            llm::identify_species(&self.model, &input).await
        };

        match outcome {
            Ok(result) => {
                log::info!(
                    "[PIPELINE] Result ready in {}ms",
                    start.elapsed().as_millis()
                );
                self.state.result = Some(result);
                self.state.phase = Phase::ResultReady;
                Ok(())
            }
            Err(e) => {
                log::error!("[PIPELINE] Identification failed: {}", e);
                self.state.error = Some(e.user_message());
                self.state.phase = Phase::Failed;
                self.notify(
                    NotificationKind::Error,
                    "Identification error",
                    "The species could not be identified. Please try again.",
                );
                Err(e)
            }
        }
    }

    /// Back to a blank session. Location and favorites survive.
    pub fn reset(&mut self) {
        self.camera = None;
        self.state = SessionState {
            location: self.state.location.take(),
            location_advisory: self.state.location_advisory.take(),
            ..SessionState::default()
        };
    }

    // ── Favorites ────────────────────────────────────────────────────

    /// Show a saved favorite. Never calls the model.
    pub fn select_favorite(&mut self, key: &str) -> bool {
        let Some(entry) = self.favorites.get(key) else {
            return false;
        };
        self.camera = None;
        self.state.result = Some(entry.result);
        self.state.image = entry.image;
        self.state.error = None;
        self.state.loading = false;
        self.state.phase = Phase::ResultReady;
        log::info!("[PIPELINE] Showing favorite {}", key);
        true
    }

    pub fn is_current_favorite(&self) -> bool {
        self.state
            .result
            .as_ref()
            .is_some_and(|r| self.favorites.contains(&r.scientific_name))
    }

    /// Save the current result with the current image. Returns whether
    /// the result is stored afterwards.
    pub fn save_favorite(&mut self) -> bool {
        let (Some(result), Some(image)) = (self.state.result.clone(), self.state.image.clone())
        else {
            return false;
        };
        match self.favorites.add(result, image) {
            Ok(()) => true,
            Err(e) => {
                self.storage_failed(e);
                false
            }
        }
    }

    /// Star button: add the current result if absent, remove it otherwise.
    /// Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self) -> bool {
        let Some(key) = self
            .state
            .result
            .as_ref()
            .map(|r| r.scientific_name.clone())
        else {
            return false;
        };
        if self.favorites.contains(&key) {
            self.remove_favorite(&key);
            self.favorites.contains(&key)
        } else {
            self.save_favorite()
        }
    }

    pub fn remove_favorite(&mut self, key: &str) -> bool {
        match self.favorites.remove(key) {
            Ok(removed) => removed,
            Err(e) => {
                self.storage_failed(e);
                false
            }
        }
    }

    fn storage_failed(&mut self, e: crate::error::StorageError) {
        log::error!("[FAVORITES] Failed to save favorites: {}", e);
        self.notify(
            NotificationKind::Advisory,
            "Favorites not saved",
            "Your favorites could not be written to disk.",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CameraStream;
    use crate::error::UpstreamError;
    use crate::favorites::MemoryBackend;
    use crate::llm::schema::fixtures::oak;
    use crate::llm::ModelRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned(Result<String, ()>);

    impl SpeciesModel for Canned {
        async fn generate(&self, _request: &ModelRequest) -> Result<String, UpstreamError> {
            self.0
                .clone()
                .map_err(|_| UpstreamError::Http("connection reset".into()))
        }
    }

    /// Never answers the first request; answers every later one.
    struct StallsOnce {
        calls: AtomicUsize,
        reply: String,
    }

    impl SpeciesModel for StallsOnce {
        async fn generate(&self, _request: &ModelRequest) -> Result<String, UpstreamError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(self.reply.clone())
        }
    }

    struct BrokenStream;

    impl CameraStream for BrokenStream {
        fn frame(&mut self) -> Result<DynamicImage, CaptureError> {
            Err(CaptureError::Frame("sensor timeout".into()))
        }

        fn stop(&mut self) {}
    }

    struct BrokenCamera;

    impl CameraDevice for BrokenCamera {
        fn open(&mut self) -> Result<Box<dyn CameraStream>, PermissionError> {
            Ok(Box::new(BrokenStream))
        }
    }

    fn identifier(reply: Result<String, ()>) -> Identifier<Canned, MemoryBackend> {
        Identifier::new(Canned(reply), FavoritesStore::load(MemoryBackend::new()))
    }

    fn png() -> DataUri {
        DataUri::parse("data:image/png;base64,AAAA", "photoDataUri").unwrap()
    }

    #[test]
    fn starts_idle() {
        let id = identifier(Err(()));
        assert_eq!(id.state().phase, Phase::Idle);
        assert!(!id.can_identify());
    }

    #[tokio::test]
    async fn identify_without_image_is_refused() {
        let mut id = identifier(Err(()));
        let err = id.identify().await.unwrap_err();
        assert!(matches!(err, IdentifyError::NoImageSelected));
        assert_eq!(id.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn new_image_clears_previous_failure() {
        let mut id = identifier(Err(()));
        id.select_image(png());
        let _ = id.identify().await;
        assert_eq!(id.state().phase, Phase::Failed);
        assert!(id.state().error.is_some());

        id.select_image(png());
        assert_eq!(id.state().phase, Phase::ImageSelected);
        assert!(id.state().error.is_none());
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let reply = serde_json::to_string(&oak()).unwrap();
        let mut id = identifier(Ok(reply));
        id.select_image(png());
        id.identify().await.unwrap();

        assert!(id.toggle_favorite());
        assert!(id.is_current_favorite());
        assert!(!id.toggle_favorite());
        assert!(id.favorites().is_empty());
    }

    #[tokio::test]
    async fn reset_keeps_location() {
        let mut id = identifier(Err(()));
        id.mount(crate::geolocation::FixedLocation(Coordinates {
            latitude: 1.0,
            longitude: 2.0,
        }));
        id.wait_for_location().await;
        id.select_image(png());
        id.reset();
        assert_eq!(id.state().phase, Phase::Idle);
        assert!(id.state().image.is_none());
        assert_eq!(id.state().location.as_deref(), Some("1, 2"));
    }

    #[tokio::test]
    async fn abandoned_identify_leaves_session_usable() {
        let model = StallsOnce {
            calls: AtomicUsize::new(0),
            reply: serde_json::to_string(&oak()).unwrap(),
        };
        let mut id = Identifier::new(model, FavoritesStore::load(MemoryBackend::new()));
        id.select_image(png());

        tokio::select! {
            biased;
            _ = id.identify() => panic!("first request should never complete"),
            _ = async {} => {}
        }

        assert_eq!(id.state().phase, Phase::ImageSelected);
        assert!(!id.state().loading);
        assert!(id.can_identify());

        id.select_image(png());
        id.identify().await.unwrap();
        assert_eq!(id.state().phase, Phase::ResultReady);
        assert!(!id.state().loading);
    }

    #[test]
    fn failed_capture_still_leaves_camera_mode() {
        let mut id = identifier(Err(()));
        assert!(id.activate_camera(&mut BrokenCamera));
        assert_eq!(id.state().input_mode, InputMode::Camera);

        assert!(matches!(id.capture_frame(), Err(CaptureError::Frame(_))));
        assert_eq!(id.state().input_mode, InputMode::Upload);
        assert!(!id.camera_active());
        assert_eq!(id.state().phase, Phase::Idle);
    }

    #[test]
    fn unknown_favorite_is_not_selected() {
        let mut id = identifier(Err(()));
        assert!(!id.select_favorite("Nope nope"));
        assert_eq!(id.state().phase, Phase::Idle);
    }
}
