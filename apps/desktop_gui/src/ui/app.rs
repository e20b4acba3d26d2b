use std::path::{Path, PathBuf};

use client_core::{Settings, SubmissionStage, VisitSubmission};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{VisitForm, VisitorRecord};
use storage::{JsonFileStore, KeyValueStore, MemoryStore, VisitorBook};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{self, NavAction, NavigationState};
use crate::media::{
    camera::{self, PhotoCapture},
    particles::ParticleBackdrop,
    signature::SignaturePad,
};
use crate::ui::widgets::{self, MediaTextures};

const DEFAULT_THANKS: &str = "Terima kasih telah berkunjung!";
const CLOUD_SYNC_WARNING: &str = "Gagal koneksi ke server, namun data tersimpan lokal.";

#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_root: PathBuf,
}

impl AppPaths {
    pub fn from_startup(startup: &StartupConfig, settings: &Settings) -> anyhow::Result<Self> {
        let data_root = settings.resolve_data_dir(startup.data_dir.as_deref())?;
        Ok(Self { data_root })
    }
}

pub type KioskBook = VisitorBook<Box<dyn KeyValueStore>>;

pub fn open_visitor_book(data_root: &Path) -> anyhow::Result<KioskBook> {
    let store = JsonFileStore::open_in_dir(data_root)?;
    tracing::info!(path = %store.path().display(), "using visitor store");
    VisitorBook::open(Box::new(store) as Box<dyn KeyValueStore>)
}

/// Volatile book for when the data directory cannot be used.
pub fn memory_visitor_book() -> anyhow::Result<KioskBook> {
    VisitorBook::open(Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validasi",
        UiErrorCategory::Hardware => "Perangkat",
        UiErrorCategory::Transport => "Koneksi",
        UiErrorCategory::Storage => "Penyimpanan",
        UiErrorCategory::Unknown => "Kesalahan",
    }
}

pub struct GuestbookApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    pub(crate) school_name: String,
    pub(crate) cloud_forwarding: bool,
    paths: AppPaths,
    pub(crate) book: KioskBook,
    pub(crate) nav: NavigationState,
    pub(crate) form: VisitForm,
    pub(crate) camera: PhotoCapture,
    pub(crate) signature: Option<SignaturePad>,
    pub(crate) textures: MediaTextures,
    backdrop: ParticleBackdrop,
    pub(crate) stage: Option<SubmissionStage>,
    /// Bumped whenever the draft is discarded.
    draft_generation: u64,
    /// Draft generation of the submission in flight.
    submitted_draft: Option<u64>,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl GuestbookApp {
    pub fn new(
        settings: &Settings,
        paths: AppPaths,
        book: KioskBook,
        startup_notice: Option<String>,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let status_banner = startup_notice.map(|message| StatusBanner {
            severity: StatusBannerSeverity::Warning,
            message,
        });
        Self {
            cmd_tx,
            ui_rx,
            school_name: settings.school_name.clone(),
            cloud_forwarding: settings.cloud_forwarding_enabled,
            paths,
            book,
            nav: NavigationState::default(),
            form: VisitForm::default(),
            camera: PhotoCapture::new(camera::default_device()),
            signature: None,
            textures: MediaTextures::default(),
            backdrop: ParticleBackdrop::default(),
            stage: None,
            draft_generation: 0,
            submitted_draft: None,
            status: "Starting backend worker".to_string(),
            status_banner,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    tracing::info!("{message}");
                    self.status = message;
                }
                UiEvent::StageChanged(stage) => {
                    self.stage = Some(stage);
                }
                UiEvent::VisitRecorded(record) => self.finish_submission(*record),
                UiEvent::SubmissionRejected(err) => {
                    self.submitted_draft = None;
                    self.apply(NavAction::SubmitRejected);
                    self.stage = None;
                    self.status = err.to_string();
                    self.status_banner = Some(StatusBanner {
                        severity: StatusBannerSeverity::Error,
                        message: err.user_message().to_string(),
                    });
                }
                UiEvent::Error(err) => self.show_error(&err),
            }
        }
    }

    pub(crate) fn show_error(&mut self, err: &UiError) {
        self.status = format!("{} error: {}", err_label(err.category()), err.message());
        tracing::warn!(context = ?err.context(), "{}", self.status);

        if err.is_background() {
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Warning,
                message: CLOUD_SYNC_WARNING.to_string(),
            });
            return;
        }

        if err.context() == UiErrorContext::BackendStartup && self.nav.submitting {
            self.submitted_draft = None;
            self.apply(NavAction::SubmitRejected);
            self.stage = None;
        }
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: format!("{}: {}", err_label(err.category()), err.message()),
        });
    }

    fn finish_submission(&mut self, record: VisitorRecord) {
        let message = record
            .summary_message
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_THANKS.to_string());

        if let Err(err) = self.book.prepend(record) {
            let err = UiError::from_message(UiErrorContext::LocalStorage, format!("{err:#}"));
            self.show_error(&err);
        }

        self.stage = None;
        self.status = format!("Total tamu: {}", self.book.len());
        let same_draft = self.submitted_draft.take() == Some(self.draft_generation);
        self.apply(NavAction::SubmitCompleted { message });
        if same_draft {
            self.reset_draft();
        }
    }

    pub(crate) fn submit_form(&mut self) {
        let before = self.nav.submitting;
        self.apply(NavAction::SubmitStarted);
        if before || !self.nav.submitting {
            return;
        }

        if let Err(err) = self.form.validate() {
            self.apply(NavAction::SubmitRejected);
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: err.user_message().to_string(),
            });
            return;
        }

        self.status_banner = None;
        self.stage = None;
        let submission = VisitSubmission {
            form: self.form.clone(),
            photo: self.camera.photo().cloned(),
            signature: self
                .signature
                .as_ref()
                .and_then(|pad| pad.signature().cloned()),
        };

        self.submitted_draft = Some(self.draft_generation);
        if !dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Submit(submission),
            &mut self.status,
        ) {
            self.submitted_draft = None;
            self.apply(NavAction::SubmitRejected);
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: self.status.clone(),
            });
        }
    }

    pub(crate) fn apply(&mut self, action: NavAction) {
        let next = reducer::reduce(&self.nav, action);
        let left_form = reducer::left_form(&self.nav, &next);
        self.nav = next;
        if left_form {
            self.reset_draft();
        }
    }

    fn reset_draft(&mut self) {
        self.draft_generation += 1;
        self.form = VisitForm::default();
        self.camera.retake();
        self.signature = None;
        self.textures.clear_form();
    }

    pub(crate) fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        let (fill, stroke, text) = match banner.severity {
            StatusBannerSeverity::Error => (
                egui::Color32::from_rgb(254, 226, 226),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(248, 113, 113)),
                egui::Color32::from_rgb(153, 27, 27),
            ),
            StatusBannerSeverity::Warning => (
                egui::Color32::from_rgb(254, 249, 195),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(250, 204, 21)),
                egui::Color32::from_rgb(133, 77, 14),
            ),
        };

        egui::Frame::NONE
            .fill(fill)
            .stroke(stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&banner.message).color(text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Tutup").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }
}

impl eframe::App for GuestbookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        widgets::paint_backdrop(ctx, &mut self.backdrop);

        self.show_header(ctx);
        self.show_footer(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.show_content(ui));
        self.show_success_overlay(ctx);

        if self.nav.submitting {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl Drop for GuestbookApp {
    fn drop(&mut self) {
        self.camera.cancel();
        self.backdrop.stop();
        tracing::info!(data_root = %self.paths.data_root.display(), status = %self.status, "kiosk closed");
    }
}
