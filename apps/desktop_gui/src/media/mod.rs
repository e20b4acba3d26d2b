//! Media surfaces for the kiosk: animated backdrop, signature pad and camera capture.

pub mod camera;
pub mod particles;
pub mod signature;
