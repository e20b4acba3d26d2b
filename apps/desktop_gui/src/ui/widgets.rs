//! Reusable egui pieces: backdrop painting, media panels, badges and cards.

use std::{collections::HashMap, sync::Arc};

use eframe::egui;
use egui::{Color32, RichText, Stroke, TextureHandle, TextureOptions};
use image::RgbImage;
use shared::domain::{EncodedImage, VisitorId, VisitorRecord};

use crate::controller::events::{UiError, UiErrorContext};
use crate::media::{
    camera::{CameraState, PhotoCapture},
    particles::{
        ParticleBackdrop, LINK_RGB, LINK_WIDTH, POINTER_LINK_RGB, POINTER_LINK_WIDTH,
    },
    signature::{PointerSample, SignaturePad},
};
use crate::ui::theme;

const THUMBNAIL_SIZE: f32 = 48.0;
const PHOTO_PREVIEW_HEIGHT: f32 = 240.0;

/// GPU copies of the media shown on screen.
#[derive(Default)]
pub struct MediaTextures {
    camera_preview: Option<TextureHandle>,
    last_frame: Option<Arc<RgbImage>>,
    photo: Option<TextureHandle>,
    signature: Option<TextureHandle>,
    signature_revision: Option<u64>,
    thumbnails: HashMap<VisitorId, Option<TextureHandle>>,
}

impl MediaTextures {
    /// Forgets everything tied to the current form draft.
    pub fn clear_form(&mut self) {
        self.camera_preview = None;
        self.last_frame = None;
        self.photo = None;
        self.signature = None;
        self.signature_revision = None;
    }
}

pub fn decode_color_image(image: &EncodedImage) -> Option<egui::ColorImage> {
    let bytes = match image.decode() {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!("skipping undecodable image: {err}");
            return None;
        }
    };
    let rgba = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(err) => {
            tracing::debug!("skipping unreadable image payload: {err}");
            return None;
        }
    };
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_raw(),
    ))
}

fn faded(rgb: [u8; 3], opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], alpha)
}

/// Paints the particle field behind every panel and schedules the next frame.
pub fn paint_backdrop(ctx: &egui::Context, backdrop: &mut ParticleBackdrop) {
    let screen = ctx.screen_rect();
    let origin = screen.min.to_vec2();

    ctx.input(|input| {
        for event in &input.events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    backdrop.pointer_mut().moved(*pos - origin);
                }
                egui::Event::Touch {
                    phase: egui::TouchPhase::End | egui::TouchPhase::Cancel,
                    ..
                } => backdrop.pointer_mut().touch_ended(),
                egui::Event::Touch { pos, .. } => {
                    backdrop.pointer_mut().moved(*pos - origin);
                }
                _ => {}
            }
        }
    });

    let painter = ctx.layer_painter(egui::LayerId::background());
    painter.rect_filled(screen, 0.0, theme::BACKGROUND);

    if let Some((particles, scene)) = backdrop.frame(screen.size()) {
        for particle in particles {
            painter.circle_filled(particle.pos + origin, particle.radius, particle.color);
        }
        for link in &scene.links {
            painter.line_segment(
                [link.from + origin, link.to + origin],
                Stroke::new(LINK_WIDTH, faded(LINK_RGB, link.opacity)),
            );
        }
        for link in &scene.pointer_links {
            painter.line_segment(
                [link.from + origin, link.to + origin],
                Stroke::new(POINTER_LINK_WIDTH, faded(POINTER_LINK_RGB, link.opacity)),
            );
        }
    }

    if backdrop.is_running() {
        ctx.request_repaint();
    }
}

/// White rounded panel used for every screen section.
pub fn card<R>(ui: &mut egui::Ui, add: impl FnOnce(&mut egui::Ui) -> R) -> egui::InnerResponse<R> {
    egui::Frame::NONE
        .fill(theme::CARD_FILL)
        .stroke(Stroke::new(1.0, theme::CARD_STROKE))
        .corner_radius(16.0)
        .inner_margin(egui::Margin::same(20))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add(ui)
        })
}

/// Lays `add` out in a column no wider than `max_width`, centered horizontally.
pub fn centered_column(ui: &mut egui::Ui, max_width: f32, add: impl FnOnce(&mut egui::Ui)) {
    let width = ui.available_width().min(max_width);
    let side = ((ui.available_width() - width) / 2.0).max(0.0);
    ui.horizontal(|ui| {
        ui.add_space(side);
        ui.vertical(|ui| {
            ui.set_width(width);
            add(ui);
        });
    });
}

pub fn category_badge(ui: &mut egui::Ui, category: &str) {
    let (fill, text) = theme::category_badge_colors(category);
    egui::Frame::NONE
        .fill(fill)
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(RichText::new(category).small().strong().color(text));
        });
}

pub fn primary_button(text: impl Into<String>, enabled: bool) -> egui::Button<'static> {
    let fill = if enabled { theme::ACCENT } else { theme::DISABLED };
    egui::Button::new(RichText::new(text.into()).strong().color(Color32::WHITE))
        .fill(fill)
        .corner_radius(10.0)
}

/// Photo thumbnail for the list, or a lettered placeholder.
pub fn visitor_thumbnail(ui: &mut egui::Ui, textures: &mut MediaTextures, record: &VisitorRecord) {
    let ctx = ui.ctx().clone();
    let texture = textures
        .thumbnails
        .entry(record.id.clone())
        .or_insert_with(|| {
            record
                .photo_image
                .as_ref()
                .and_then(decode_color_image)
                .map(|image| {
                    ctx.load_texture(
                        format!("visitor-photo-{}", record.id),
                        image,
                        TextureOptions::LINEAR,
                    )
                })
        });

    let size = egui::vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE);
    match texture {
        Some(texture) => {
            ui.add(
                egui::Image::new((texture.id(), size))
                    .fit_to_exact_size(size)
                    .corner_radius(24.0),
            );
        }
        None => {
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            let painter = ui.painter();
            painter.circle_filled(rect.center(), THUMBNAIL_SIZE / 2.0, theme::CARD_STROKE);
            let initial = record
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default();
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                initial,
                egui::FontId::proportional(20.0),
                theme::TEXT_MUTED,
            );
        }
    }
}

/// Camera section of the form: open button, live preview or captured photo.
pub fn camera_panel(
    ui: &mut egui::Ui,
    camera: &mut PhotoCapture,
    textures: &mut MediaTextures,
) -> Option<UiError> {
    let mut error = None;

    if let Some(photo) = camera.photo() {
        if textures.photo.is_none() {
            textures.photo = decode_color_image(photo).map(|image| {
                ui.ctx()
                    .load_texture("captured-photo", image, TextureOptions::LINEAR)
            });
        }
        let mut retake = false;
        ui.horizontal(|ui| {
            if let Some(texture) = &textures.photo {
                ui.add(
                    egui::Image::new(texture)
                        .max_height(PHOTO_PREVIEW_HEIGHT)
                        .corner_radius(12.0),
                );
            } else {
                ui.label("Foto tersimpan.");
            }
            if ui.button("✖").on_hover_text("Foto ulang").clicked() {
                retake = true;
            }
        });
        if retake {
            camera.retake();
            textures.photo = None;
        }
        return None;
    }

    match camera.state() {
        CameraState::Open => {
            if let Some(frame) = camera.preview_frame() {
                let changed = textures
                    .last_frame
                    .as_ref()
                    .is_none_or(|last| !Arc::ptr_eq(last, &frame));
                if changed {
                    let image = egui::ColorImage::from_rgb(
                        [frame.width() as usize, frame.height() as usize],
                        frame.as_raw(),
                    );
                    match &mut textures.camera_preview {
                        Some(texture) => texture.set(image, TextureOptions::LINEAR),
                        None => {
                            textures.camera_preview = Some(ui.ctx().load_texture(
                                "camera-preview",
                                image,
                                TextureOptions::LINEAR,
                            ))
                        }
                    }
                    textures.last_frame = Some(frame);
                }
            }
            match &textures.camera_preview {
                Some(texture) => {
                    ui.add(
                        egui::Image::new(texture)
                            .max_height(PHOTO_PREVIEW_HEIGHT)
                            .corner_radius(12.0),
                    );
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Menyiapkan kamera...");
                    });
                }
            }
            ui.horizontal(|ui| {
                if ui.add(primary_button("Ambil Foto", true)).clicked() {
                    match camera.capture() {
                        Ok(_) => {
                            textures.camera_preview = None;
                            textures.last_frame = None;
                        }
                        Err(err) => {
                            error = Some(UiError::from_message(
                                UiErrorContext::Camera,
                                format!("{} ({err})", err.user_message()),
                            ));
                        }
                    }
                }
                if ui.button("Batal").clicked() {
                    camera.cancel();
                    textures.camera_preview = None;
                    textures.last_frame = None;
                }
            });
        }
        CameraState::Closed => {
            if ui.button("📷 Buka Kamera").clicked() {
                if let Err(err) = camera.start() {
                    error = Some(UiError::from_message(
                        UiErrorContext::Camera,
                        format!("{} ({err})", err.user_message()),
                    ));
                }
            }
        }
    }

    error
}

/// Signature surface. The pad is created on first display with the width
/// available at that moment and keeps that width until discarded.
pub fn signature_panel(
    ui: &mut egui::Ui,
    slot: &mut Option<SignaturePad>,
    textures: &mut MediaTextures,
) -> Option<UiError> {
    if slot.is_none() {
        let width = ui.available_width().floor().max(0.0) as u32;
        match SignaturePad::new(width) {
            Ok(pad) => *slot = Some(pad),
            Err(err) => {
                return Some(UiError::from_message(
                    UiErrorContext::Signature,
                    err.to_string(),
                ))
            }
        }
    }
    let pad = slot.as_mut()?;

    let size = egui::vec2(pad.width() as f32, pad.height() as f32);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());
    let to_local = |pos: egui::Pos2| (pos - rect.min).to_pos2();

    let (press_origin, position) =
        ui.input(|i| (i.pointer.press_origin(), i.pointer.interact_pos()));
    let sample = PointerSample {
        held: response.is_pointer_button_down_on(),
        press_origin: press_origin.filter(|pos| rect.contains(*pos)).map(to_local),
        position: position.map(to_local),
    };
    let error = pad.track_pointer(sample).err();

    if textures.signature_revision != Some(pad.revision()) {
        let image = egui::ColorImage::from_rgba_premultiplied(
            [pad.width() as usize, pad.height() as usize],
            pad.pixels(),
        );
        match &mut textures.signature {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                textures.signature = Some(ui.ctx().load_texture(
                    "signature-pad",
                    image,
                    TextureOptions::LINEAR,
                ))
            }
        }
        textures.signature_revision = Some(pad.revision());
    }

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 8.0, Color32::WHITE);
    if let Some(texture) = &textures.signature {
        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }
    painter.rect_stroke(
        rect,
        8.0,
        Stroke::new(2.0, theme::CARD_STROKE),
        egui::StrokeKind::Inside,
    );

    error.map(|err| UiError::from_message(UiErrorContext::Signature, err.to_string()))
}
