//! Shared test helpers for the identification pipeline tests.

#![allow(dead_code)]

use natureid_lib::capture::{CameraDevice, CameraStream};
use natureid_lib::error::{CaptureError, PermissionError, UpstreamError};
use natureid_lib::geolocation::{Coordinates, GeolocationProvider};
use natureid_lib::llm::{ModelRequest, SpeciesModel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PNG_URI: &str = "data:image/png;base64,AAAA";

/// A model that answers every request with the same canned reply and
/// records what it was asked.
#[derive(Clone)]
pub struct MockModel {
    reply: Result<String, String>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl MockModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails with an HTTP error.
    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            ..Self::replying("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ModelRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl SpeciesModel for MockModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(UpstreamError::Http)
    }
}

/// The user refuses the location prompt.
pub struct DeniedLocation;

impl GeolocationProvider for DeniedLocation {
    async fn current_position(&self) -> Result<Coordinates, PermissionError> {
        Err(PermissionError::Geolocation("User denied Geolocation".into()))
    }
}

/// The user refuses the camera prompt.
pub struct DeniedCamera;

impl CameraDevice for DeniedCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, PermissionError> {
        Err(PermissionError::Camera("Permission denied".into()))
    }
}

/// A camera producing solid green 4x4 frames. Counts stopped streams.
#[derive(Default)]
pub struct GreenCamera {
    pub stopped: Arc<AtomicUsize>,
}

struct GreenStream {
    stopped: Arc<AtomicUsize>,
}

impl CameraStream for GreenStream {
    fn frame(&mut self) -> Result<image::DynamicImage, CaptureError> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([30, 160, 60]));
        Ok(image::DynamicImage::ImageRgb8(img))
    }

    fn stop(&mut self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

impl CameraDevice for GreenCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, PermissionError> {
        Ok(Box::new(GreenStream {
            stopped: self.stopped.clone(),
        }))
    }
}

/// A schema-valid identification of a fly agaric, as the model returns it.
pub fn amanita_json() -> String {
    serde_json::json!({
        "commonName": "Fly agaric",
        "scientificName": "Amanita muscaria",
        "confidence": 0.88,
        "speciesType": "mushroom",
        "taxonomy": {
            "kingdom": "Fungi",
            "phylum": "Basidiomycota",
            "class": "Agaricomycetes",
            "order": "Agaricales",
            "family": "Amanitaceae",
            "genus": "Amanita",
            "species": "Amanita muscaria"
        },
        "taxonomyConfidence": {
            "kingdom": 0.99,
            "phylum": 0.98,
            "class": 0.97,
            "order": 0.95,
            "family": 0.93,
            "genus": 0.91,
            "species": 0.88
        },
        "description": "A conspicuous red-capped mushroom with white warts.",
        "characteristics": {
            "habitat": "Birch and pine woodland",
            "size": "Cap 8-20 cm across"
        },
        "physicalDescription": "Red cap covered in white wart-like remnants of the veil.",
        "behaviorAndEcology": "Forms mycorrhizal associations with trees.",
        "geographicDistribution": "Temperate and boreal Northern Hemisphere.",
        "conservationStatus": "Not evaluated",
        "threats": "Habitat loss.",
        "humanUses": "Folklore and illustration; toxic if eaten.",
        "similarSpecies": "Amanita caesarea",
        "interestingFacts": [
            "It is poisonous and psychoactive.",
            "It appears in many fairy tales.",
            "Flies were once killed with it soaked in milk.",
            "It can grow in large rings."
        ]
    })
    .to_string()
}
