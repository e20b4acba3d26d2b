//! UI layer for the kiosk: app shell, screens, widgets, and theme.

pub mod app;
pub mod screens;
pub mod theme;
pub mod widgets;

pub use app::{AppPaths, GuestbookApp, StartupConfig};
