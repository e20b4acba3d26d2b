//! Backend commands queued from UI to backend worker.

use client_core::VisitSubmission;

pub enum BackendCommand {
    Submit(VisitSubmission),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit(_) => "submit",
        }
    }
}
