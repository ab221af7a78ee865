//! Live camera capture as a scoped device handle.
//!
//! A `CameraSession` owns an open stream. The stream is stopped when the
//! session is dropped, so leaving the camera tab, resetting, capturing a
//! frame or tearing down the orchestrator all release the device.

use super::{encode_frame, DataUri};
use crate::error::{CaptureError, PermissionError};
use image::DynamicImage;

/// A running video stream.
pub trait CameraStream: Send {
    /// Sample the current frame.
    fn frame(&mut self) -> Result<DynamicImage, CaptureError>;
    /// Stop the stream and release the device.
    fn stop(&mut self);
}

/// Something that can be asked for a video stream. Opening may be refused.
pub trait CameraDevice {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, PermissionError>;
}

pub struct CameraSession {
    stream: Option<Box<dyn CameraStream>>,
}

impl CameraSession {
    pub fn open(device: &mut dyn CameraDevice) -> Result<Self, PermissionError> {
        let stream = device.open()?;
        log::info!("[CAPTURE] Camera stream opened");
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Current frame for a live preview. The stream keeps running.
    pub fn preview(&mut self) -> Result<DynamicImage, CaptureError> {
        match self.stream.as_mut() {
            Some(stream) => stream.frame(),
            None => Err(CaptureError::NoActiveStream),
        }
    }

    /// Sample the current frame into a still PNG and end the stream.
    pub fn capture(mut self) -> Result<DataUri, CaptureError> {
        let frame = self.preview()?;
        self.release();
        encode_frame(&frame)
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::info!("[CAPTURE] Camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}
