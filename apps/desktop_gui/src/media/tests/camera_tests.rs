use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use image::Rgb;

struct FakeStream {
    live_tracks: Arc<AtomicUsize>,
    stopped: bool,
    frame: Option<Arc<RgbImage>>,
}

impl CameraStream for FakeStream {
    fn latest_frame(&mut self) -> Option<Arc<RgbImage>> {
        self.frame.clone()
    }

    fn active_tracks(&self) -> usize {
        usize::from(!self.stopped)
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

struct FakeCamera {
    live_tracks: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
    with_frame: bool,
    deny: bool,
}

impl FakeCamera {
    fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let live = Arc::new(AtomicUsize::new(0));
        let opened = Arc::new(AtomicUsize::new(0));
        (
            Self {
                live_tracks: live.clone(),
                opened: opened.clone(),
                with_frame: true,
                deny: false,
            },
            live,
            opened,
        )
    }
}

impl CameraDevice for FakeCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        if self.deny {
            return Err(CameraError::PermissionDenied("NotAllowedError".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live_tracks.fetch_add(1, Ordering::SeqCst);
        let frame = self.with_frame.then(|| {
            Arc::new(RgbImage::from_fn(64, 48, |x, y| {
                Rgb([(x * 4) as u8, (y * 5) as u8, 120])
            }))
        });
        Ok(Box::new(FakeStream {
            live_tracks: self.live_tracks.clone(),
            stopped: false,
            frame,
        }))
    }
}

#[test]
fn capture_encodes_jpeg_and_releases_camera() {
    let (camera, live, _) = FakeCamera::new();
    let mut capture = PhotoCapture::new(Box::new(camera));

    capture.start().expect("start");
    assert_eq!(capture.state(), CameraState::Open);
    assert_eq!(live.load(Ordering::SeqCst), 1);
    assert_eq!(capture.active_tracks(), 1);
    assert!(capture.preview_frame().is_some());

    let photo = capture.capture().expect("capture").clone();
    assert_eq!(photo.mime_type(), Some("image/jpeg"));
    let decoded = image::load_from_memory(&photo.decode().expect("payload")).expect("jpeg");
    assert_eq!((decoded.width(), decoded.height()), (64, 48));

    assert_eq!(capture.state(), CameraState::Closed);
    assert_eq!(capture.active_tracks(), 0);
    assert_eq!(live.load(Ordering::SeqCst), 0);
    assert_eq!(capture.photo(), Some(&photo));
}

#[test]
fn cancel_stops_stream_without_photo() {
    let (camera, live, _) = FakeCamera::new();
    let mut capture = PhotoCapture::new(Box::new(camera));
    capture.start().expect("start");

    capture.cancel();
    assert_eq!(capture.state(), CameraState::Closed);
    assert_eq!(live.load(Ordering::SeqCst), 0);
    assert!(capture.photo().is_none());
}

#[test]
fn dropping_an_open_capture_stops_every_track() {
    let (camera, live, _) = FakeCamera::new();
    let mut capture = PhotoCapture::new(Box::new(camera));
    capture.start().expect("start");
    assert_eq!(live.load(Ordering::SeqCst), 1);

    drop(capture);
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn retake_discards_photo_and_start_reopens() {
    let (camera, live, opened) = FakeCamera::new();
    let mut capture = PhotoCapture::new(Box::new(camera));
    capture.start().expect("start");
    capture.capture().expect("capture");

    capture.retake();
    assert!(capture.photo().is_none());
    assert_eq!(capture.state(), CameraState::Closed);

    capture.start().expect("restart");
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    assert_eq!(live.load(Ordering::SeqCst), 1);
    capture.retake();
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn starting_twice_keeps_a_single_stream() {
    let (camera, live, opened) = FakeCamera::new();
    let mut capture = PhotoCapture::new(Box::new(camera));
    capture.start().expect("start");
    capture.start().expect("already open");
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(live.load(Ordering::SeqCst), 1);
}

#[test]
fn capture_before_first_frame_keeps_camera_open() {
    let (mut camera, live, _) = FakeCamera::new();
    camera.with_frame = false;
    let mut capture = PhotoCapture::new(Box::new(camera));

    assert_eq!(capture.capture().err(), Some(CameraError::NotOpen));
    capture.start().expect("start");
    assert_eq!(capture.capture().err(), Some(CameraError::NoFrame));
    assert_eq!(capture.state(), CameraState::Open);
    assert_eq!(live.load(Ordering::SeqCst), 1);
}

#[test]
fn denied_permission_leaves_camera_closed() {
    let (mut camera, live, _) = FakeCamera::new();
    camera.deny = true;
    let mut capture = PhotoCapture::new(Box::new(camera));

    let err = capture.start().expect_err("denied");
    assert!(matches!(err, CameraError::PermissionDenied(_)));
    assert_eq!(
        err.user_message(),
        "Tidak dapat mengakses kamera. Pastikan izin diberikan."
    );
    assert_eq!(capture.state(), CameraState::Closed);
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn build_without_backend_reports_unavailable() {
    let mut capture = PhotoCapture::new(Box::new(UnavailableCamera));
    assert!(matches!(capture.start(), Err(CameraError::Unavailable(_))));
}
