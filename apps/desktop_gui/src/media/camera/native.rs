//! nokhwa-backed camera. Frames are pulled on a dedicated thread because the
//! platform camera handle cannot leave the thread that opened it.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::bounded;
use image::RgbImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera, NokhwaError,
};

use super::{CameraDevice, CameraError, CameraStream};

const FRAME_RETRY_DELAY: Duration = Duration::from_millis(30);

#[derive(Debug, Default)]
pub struct NativeCamera {
    index: u32,
}

impl NativeCamera {
    pub fn with_index(index: u32) -> Self {
        Self { index }
    }
}

impl CameraDevice for NativeCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        let index = self.index;
        let latest = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = bounded(1);

        let worker = {
            let latest = Arc::clone(&latest);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("camera-capture".to_string())
                .spawn(move || capture_loop(index, ready_tx, latest, running))
                .map_err(|err| CameraError::Unavailable(err.to_string()))?
        };

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(NativeStream {
                latest,
                running,
                worker: Some(worker),
            })),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => Err(CameraError::Unavailable(
                "camera thread exited before opening".to_string(),
            )),
        }
    }
}

type SharedFrame = Arc<Mutex<Option<Arc<RgbImage>>>>;

fn capture_loop(
    index: u32,
    ready_tx: crossbeam_channel::Sender<Result<(), CameraError>>,
    latest: SharedFrame,
    running: Arc<AtomicBool>,
) {
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
        Ok(camera) => camera,
        Err(err) => {
            let _ = ready_tx.send(Err(map_error(err)));
            return;
        }
    };
    if let Err(err) = camera.open_stream() {
        let _ = ready_tx.send(Err(map_error(err)));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    while running.load(Ordering::Acquire) {
        let decoded = camera
            .frame()
            .and_then(|buffer| buffer.decode_image::<RgbFormat>());
        match decoded {
            Ok(decoded) => {
                let (width, height) = (decoded.width(), decoded.height());
                if let Some(frame) = RgbImage::from_raw(width, height, decoded.into_raw()) {
                    if let Ok(mut slot) = latest.lock() {
                        *slot = Some(Arc::new(frame));
                    }
                }
            }
            Err(err) => {
                tracing::debug!("camera frame dropped: {err}");
                thread::sleep(FRAME_RETRY_DELAY);
            }
        }
    }

    if let Err(err) = camera.stop_stream() {
        tracing::warn!("failed to stop camera stream: {err}");
    }
}

fn map_error(err: NokhwaError) -> CameraError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        CameraError::PermissionDenied(message)
    } else {
        CameraError::Unavailable(message)
    }
}

struct NativeStream {
    latest: SharedFrame,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl CameraStream for NativeStream {
    fn latest_frame(&mut self) -> Option<Arc<RgbImage>> {
        self.latest.lock().ok()?.clone()
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.worker.is_some())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("camera thread panicked while stopping");
            }
        }
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop();
    }
}
