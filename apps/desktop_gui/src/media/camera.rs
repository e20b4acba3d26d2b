//! Camera access for the visitor photo.
//!
//! `PhotoCapture` is the only owner of an open stream. Every exit path
//! (capture, cancel, retake, drop) stops the stream so no track stays live
//! once the form is left.

use std::{io::Cursor, sync::Arc};

use image::{codecs::jpeg::JpegEncoder, RgbImage};
use shared::domain::EncodedImage;
use thiserror::Error;

pub const JPEG_QUALITY: u8 = 70;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera is not open")]
    NotOpen,
    #[error("camera has not delivered a frame yet")]
    NoFrame,
    #[error("failed to encode photo: {0}")]
    Encode(String),
}

impl CameraError {
    /// Text shown to the visitor when the camera cannot be opened.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) | Self::Unavailable(_) => {
                "Tidak dapat mengakses kamera. Pastikan izin diberikan."
            }
            Self::NotOpen | Self::NoFrame => "Kamera belum siap. Coba lagi.",
            Self::Encode(_) => "Gagal menyimpan foto. Coba lagi.",
        }
    }
}

/// A live, user-facing video stream.
pub trait CameraStream {
    /// Most recent frame, if one has arrived.
    fn latest_frame(&mut self) -> Option<Arc<RgbImage>>;
    /// Number of tracks still producing frames.
    fn active_tracks(&self) -> usize;
    /// Releases the device. Idempotent.
    fn stop(&mut self);
}

pub trait CameraDevice {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// Stand-in used when the binary is built without a camera backend.
pub struct UnavailableCamera;

impl CameraDevice for UnavailableCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        Err(CameraError::Unavailable(
            "this build has no camera backend (enable the native-camera feature)".to_string(),
        ))
    }
}

pub fn default_device() -> Box<dyn CameraDevice> {
    #[cfg(feature = "native-camera")]
    {
        Box::new(native::NativeCamera::default())
    }
    #[cfg(not(feature = "native-camera"))]
    {
        Box::new(UnavailableCamera)
    }
}

pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<EncodedImage, CameraError> {
    let mut bytes = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(frame)
        .map_err(|err| CameraError::Encode(err.to_string()))?;
    Ok(EncodedImage::jpeg(bytes.get_ref()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Closed,
    Open,
}

pub struct PhotoCapture {
    device: Box<dyn CameraDevice>,
    stream: Option<Box<dyn CameraStream>>,
    photo: Option<EncodedImage>,
}

impl PhotoCapture {
    pub fn new(device: Box<dyn CameraDevice>) -> Self {
        Self {
            device,
            stream: None,
            photo: None,
        }
    }

    pub fn state(&self) -> CameraState {
        if self.stream.is_some() {
            CameraState::Open
        } else {
            CameraState::Closed
        }
    }

    pub fn active_tracks(&self) -> usize {
        self.stream.as_ref().map_or(0, |stream| stream.active_tracks())
    }

    pub fn photo(&self) -> Option<&EncodedImage> {
        self.photo.as_ref()
    }

    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.stream.is_some() {
            return Ok(());
        }
        match self.device.open() {
            Ok(stream) => {
                tracing::info!("camera opened");
                self.stream = Some(stream);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("camera open failed: {err}");
                Err(err)
            }
        }
    }

    pub fn preview_frame(&mut self) -> Option<Arc<RgbImage>> {
        self.stream.as_mut()?.latest_frame()
    }

    /// Encodes the current frame as JPEG (quality 70) and closes the camera.
    pub fn capture(&mut self) -> Result<&EncodedImage, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotOpen)?;
        let frame = stream.latest_frame().ok_or(CameraError::NoFrame)?;
        let photo = encode_jpeg(&frame, JPEG_QUALITY)?;
        self.release();
        tracing::debug!(width = frame.width(), height = frame.height(), "photo captured");
        Ok(self.photo.insert(photo))
    }

    /// Discards the captured photo. The camera stays closed until started again.
    pub fn retake(&mut self) {
        self.photo = None;
        self.release();
    }

    /// Closes the camera without capturing.
    pub fn cancel(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::info!("camera released");
        }
    }
}

impl Drop for PhotoCapture {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(feature = "native-camera")]
pub mod native;

#[cfg(test)]
#[path = "tests/camera_tests.rs"]
mod tests;
