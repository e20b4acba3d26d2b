//! Bridge between the egui thread and the async guestbook service.

pub mod commands;
pub mod runtime;
