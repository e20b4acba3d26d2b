//! Screen layouts. Each `show_*` renders one region of the kiosk.

use chrono::{Datelike, Local};
use client_core::SubmissionStage;
use eframe::egui;
use egui::{Color32, RichText};

use crate::controller::reducer::{NavAction, View};
use crate::media::particles::NARROW_VIEWPORT_WIDTH;
use crate::ui::{app::GuestbookApp, theme, widgets};

const MAX_CONTENT_WIDTH: f32 = 896.0;
const NAV_ITEMS: [View; 4] = [View::Home, View::Form, View::List, View::About];

const OPENING_HOURS: [&str; 2] = [
    "Senin - Kamis: 07.00 - 14.00 WIB",
    "Jumat - Sabtu: 07.00 - 11.30 WIB",
];
const ADDRESS: [&str; 2] = ["Jl. Pendidikan No. 123, Karau Kuala", "Kalimantan Tengah"];
const GREETING_VERSE: [&str; 4] = [
    "\"Burung Enggang terbangnya tinggi,\"",
    "\"Hinggap sebentar di pohon ulin.\"",
    "\"Kami menyambut sepenuh hati,\"",
    "\"Tali silaturahmi mari kita jalin.\"",
];

pub fn stage_label(stage: Option<SubmissionStage>) -> &'static str {
    match stage {
        Some(SubmissionStage::Classifying) => "Menganalisis data...",
        Some(SubmissionStage::Forwarding) => "Menyimpan & Mengirim...",
        None => "Memproses...",
    }
}

fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.label(
        RichText::new(text)
            .size(24.0)
            .strong()
            .color(theme::TEXT_STRONG),
    );
}

fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).strong().color(theme::TEXT_MUTED));
}

impl GuestbookApp {
    pub(crate) fn show_header(&mut self, ctx: &egui::Context) {
        let narrow = ctx.screen_rect().width() < NARROW_VIEWPORT_WIDTH;
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::NONE
                    .fill(theme::HEADER_FILL)
                    .inner_margin(egui::Margin::symmetric(16, 12)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let title = ui
                        .vertical(|ui| {
                            ui.label(
                                RichText::new(self.school_name.to_uppercase())
                                    .size(20.0)
                                    .strong()
                                    .color(Color32::WHITE),
                            );
                            ui.label(
                                RichText::new("BUKU TAMU DIGITAL")
                                    .small()
                                    .color(theme::HEADER_MUTED_TEXT),
                            );
                        })
                        .response
                        .interact(egui::Sense::click());
                    if title.clicked() {
                        self.apply(NavAction::Navigate(View::Home));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if narrow {
                            ui.menu_button(RichText::new("☰").size(22.0).color(Color32::WHITE), |ui| {
                                for view in NAV_ITEMS {
                                    if ui
                                        .selectable_label(self.nav.view == view, view.title())
                                        .clicked()
                                    {
                                        self.apply(NavAction::Navigate(view));
                                    }
                                }
                            });
                        } else {
                            for view in NAV_ITEMS.iter().rev().copied() {
                                let active = self.nav.view == view;
                                let text = RichText::new(view.title()).color(if active {
                                    Color32::WHITE
                                } else {
                                    theme::HEADER_MUTED_TEXT
                                });
                                let fill = if active {
                                    Color32::from_white_alpha(48)
                                } else {
                                    Color32::TRANSPARENT
                                };
                                let button = egui::Button::new(text)
                                    .fill(fill)
                                    .stroke(egui::Stroke::NONE)
                                    .corner_radius(16.0);
                                if ui.add(button).clicked() {
                                    self.apply(NavAction::Navigate(view));
                                }
                            }
                        }
                    });
                });
            });
    }

    pub(crate) fn show_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .frame(
                egui::Frame::NONE
                    .fill(theme::FOOTER_FILL)
                    .inner_margin(egui::Margin::symmetric(16, 14)),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "© {} {}. All rights reserved.",
                            Local::now().year(),
                            self.school_name
                        ))
                        .color(theme::FOOTER_TEXT),
                    );
                    ui.label(
                        RichText::new("Dikembangkan dengan Teknologi AI Google Gemini")
                            .small()
                            .color(theme::FOOTER_TEXT),
                    );
                });
            });
    }

    pub(crate) fn show_content(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(16.0);
                widgets::centered_column(ui, MAX_CONTENT_WIDTH, |ui| {
                    self.show_status_banner(ui);
                    match self.nav.view {
                        View::Home => self.show_home(ui),
                        View::Form => self.show_form(ui),
                        View::List => self.show_list(ui),
                        View::About => self.show_about(ui),
                    }
                });
                ui.add_space(24.0);
            });
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        egui::Frame::NONE
            .fill(theme::ACCENT)
            .corner_radius(20.0)
            .inner_margin(egui::Margin::symmetric(28, 32))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new("Selamat Datang")
                        .size(34.0)
                        .strong()
                        .color(Color32::WHITE),
                );
                ui.label(
                    RichText::new(format!(
                        "Portal Buku Tamu Digital {}.\nMelayani dengan sepenuh hati, mencatat dengan teknologi.",
                        self.school_name
                    ))
                    .color(theme::HEADER_MUTED_TEXT),
                );
                ui.add_space(12.0);
                let start = egui::Button::new(
                    RichText::new("✏ Mulai Isi Buku Tamu")
                        .strong()
                        .color(theme::ACCENT),
                )
                .fill(Color32::WHITE)
                .corner_radius(24.0);
                if ui.add(start).clicked() {
                    self.apply(NavAction::Navigate(View::Form));
                }
            });

        ui.add_space(16.0);
        ui.columns(2, |columns| {
            let new_guest = widgets::card(&mut columns[0], |ui| {
                ui.label(RichText::new("Tamu Baru").size(18.0).strong());
                ui.label(
                    RichText::new(
                        "Klik di sini untuk mengisi data kunjungan, foto, dan tanda tangan digital.",
                    )
                    .color(theme::TEXT_MUTED),
                );
            })
            .response
            .interact(egui::Sense::click());
            if new_guest.clicked() {
                self.apply(NavAction::Navigate(View::Form));
            }

            let profile = widgets::card(&mut columns[1], |ui| {
                ui.label(RichText::new("Profil Sekolah").size(18.0).strong());
                ui.label(
                    RichText::new(format!(
                        "Kenali lebih dekat {}, visi misi, dan budaya kami.",
                        self.school_name
                    ))
                    .color(theme::TEXT_MUTED),
                );
            })
            .response
            .interact(egui::Sense::click());
            if profile.clicked() {
                self.apply(NavAction::Navigate(View::About));
            }
        });

        ui.add_space(16.0);
        widgets::card(ui, |ui| {
            ui.label(RichText::new("Informasi Layanan").size(18.0).strong());
            ui.add_space(4.0);
            ui.columns(2, |columns| {
                columns[0].label(RichText::new("🕘 Jam Operasional").strong());
                for line in OPENING_HOURS {
                    columns[0].label(RichText::new(line).color(theme::TEXT_MUTED));
                }
                columns[1].label(RichText::new("📍 Lokasi").strong());
                for line in ADDRESS {
                    columns[1].label(RichText::new(line).color(theme::TEXT_MUTED));
                }
            });
        });
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let mut submit_clicked = false;
        widgets::card(ui, |ui| {
            section_heading(ui, "Isi Buku Tamu");

            if !self.cloud_forwarding {
                egui::Frame::NONE
                    .fill(theme::NOTICE_FILL)
                    .corner_radius(8.0)
                    .inner_margin(egui::Margin::symmetric(10, 8))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            RichText::new(
                                "Mode Offline: Data disimpan di perangkat ini. Atur sink_url di guestbook.toml untuk fitur online.",
                            )
                            .small()
                            .color(theme::NOTICE_TEXT),
                        );
                    });
            }
            ui.add_space(8.0);

            field_label(ui, "Nama Lengkap");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.name)
                    .hint_text("Masukkan nama anda")
                    .desired_width(f32::INFINITY),
            );
            field_label(ui, "Instansi / Asal");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.institution)
                    .hint_text("Contoh: Dinas Pendidikan / Wali Murid")
                    .desired_width(f32::INFINITY),
            );
            field_label(ui, "Nomor Telepon / WA");
            ui.add(
                egui::TextEdit::singleline(&mut self.form.phone)
                    .hint_text("08xxxxxxxxxx")
                    .desired_width(f32::INFINITY),
            );
            field_label(ui, "Tujuan Kunjungan");
            ui.add(
                egui::TextEdit::multiline(&mut self.form.purpose)
                    .hint_text("Jelaskan keperluan anda...")
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(8.0);
            field_label(ui, "Foto Pengunjung");
            if let Some(err) = widgets::camera_panel(ui, &mut self.camera, &mut self.textures) {
                self.show_error(&err);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                field_label(ui, "Tanda Tangan");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("⟲ Hapus").clicked() {
                        if let Some(pad) = self.signature.as_mut() {
                            pad.clear();
                        }
                    }
                });
            });
            if let Some(err) =
                widgets::signature_panel(ui, &mut self.signature, &mut self.textures)
            {
                self.show_error(&err);
            }
            ui.label(
                RichText::new("*Tanda tangan digital diatas kotak putih.")
                    .small()
                    .italics()
                    .color(theme::TEXT_MUTED),
            );

            ui.add_space(12.0);
            let submitting = self.nav.submitting;
            let label = if submitting {
                stage_label(self.stage).to_string()
            } else {
                "💾 Simpan Buku Tamu".to_string()
            };
            let button = widgets::primary_button(label, !submitting)
                .min_size(egui::vec2(ui.available_width(), 52.0));
            if ui.add_enabled(!submitting, button).clicked() {
                submit_clicked = true;
            }
        });

        if submit_clicked {
            self.submit_form();
        }
    }

    fn show_list(&mut self, ui: &mut egui::Ui) {
        widgets::card(ui, |ui| {
            ui.horizontal(|ui| {
                section_heading(ui, "Daftar Tamu Hari Ini");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("Total Tamu: {}", self.book.len()))
                            .color(theme::TEXT_MUTED),
                    );
                });
            });
            ui.separator();

            if self.book.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(
                        RichText::new("Belum ada data tamu hari ini.").color(theme::TEXT_MUTED),
                    );
                    ui.add_space(24.0);
                });
                return;
            }

            egui::Grid::new("visitor-list")
                .num_columns(5)
                .striped(true)
                .spacing(egui::vec2(16.0, 12.0))
                .show(ui, |ui| {
                    for header in ["Waktu", "Foto", "Identitas", "Tujuan", "Komentar"] {
                        ui.label(RichText::new(header).strong().color(theme::TEXT_MUTED));
                    }
                    ui.end_row();

                    for record in self.book.visitors() {
                        ui.label(
                            record
                                .timestamp
                                .with_timezone(&Local)
                                .format("%H:%M")
                                .to_string(),
                        );
                        widgets::visitor_thumbnail(ui, &mut self.textures, record);
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&record.name).strong());
                            if !record.institution.is_empty() {
                                ui.label(RichText::new(&record.institution).small());
                            }
                            if !record.phone.is_empty() {
                                ui.label(
                                    RichText::new(&record.phone)
                                        .small()
                                        .color(theme::TEXT_MUTED),
                                );
                            }
                        });
                        ui.vertical(|ui| {
                            ui.set_max_width(220.0);
                            ui.add(egui::Label::new(record.purpose.as_str()).wrap());
                        });
                        ui.vertical(|ui| {
                            ui.set_max_width(240.0);
                            widgets::category_badge(ui, record.display_category());
                            if let Some(message) = record
                                .summary_message
                                .as_deref()
                                .filter(|message| !message.is_empty())
                            {
                                ui.add(
                                    egui::Label::new(
                                        RichText::new(format!("\"{message}\""))
                                            .small()
                                            .italics()
                                            .color(theme::TEXT_MUTED),
                                    )
                                    .wrap(),
                                );
                            }
                        });
                        ui.end_row();
                    }
                });
        });
    }

    fn show_about(&mut self, ui: &mut egui::Ui) {
        widgets::card(ui, |ui| {
            section_heading(ui, &format!("Tentang {}", self.school_name));
            ui.label(
                RichText::new("\"Mewujudkan Generasi Cerdas, Berkarakter, dan Berakhlak Mulia.\"")
                    .italics()
                    .color(theme::ACCENT),
            );
            ui.add_space(6.0);
            ui.label(format!(
                "{} hadir sebagai lembaga pendidikan dasar yang berkomitmen untuk tidak hanya mencetak siswa yang unggul secara akademis, tetapi juga memiliki integritas moral yang tinggi. Kami percaya bahwa pendidikan adalah pondasi utama dalam membangun masa depan bangsa.",
                self.school_name
            ));
            ui.label(
                "Dengan lingkungan belajar yang kondusif, tenaga pengajar yang berdedikasi, dan semangat \"Merdeka Belajar\", kami berupaya menggali potensi terbaik setiap anak didik agar siap menghadapi tantangan zaman dengan tetap memegang teguh nilai-nilai luhur budaya dan agama.",
            );
            ui.horizontal(|ui| {
                widgets::category_badge(ui, "❤ Peduli & Berbudaya");
                widgets::category_badge(ui, "🍃 Lingkungan Asri");
            });
        });

        ui.add_space(16.0);
        widgets::card(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("Sapaan Khas Kalimantan Tengah")
                        .size(18.0)
                        .strong(),
                );
                for line in GREETING_VERSE {
                    ui.label(RichText::new(line).italics().color(theme::TEXT_MUTED));
                }
            });
        });

        ui.add_space(16.0);
        widgets::card(ui, |ui| {
            section_heading(ui, "Inovasi Buku Tamu Digital");
            ui.label(format!(
                "Sebagai wujud nyata transformasi digital di lingkungan sekolah, {} menghadirkan sistem Buku Tamu Digital Terpadu. Aplikasi ini dirancang untuk memodernisasi proses administrasi penerimaan tamu dengan sentuhan teknologi terkini.",
                self.school_name
            ));
            ui.add_space(6.0);
            ui.columns(2, |columns| {
                columns[0].label(RichText::new("🚀 Efisiensi & Paperless").strong());
                columns[0].label(
                    "Mengurangi penggunaan kertas dan memudahkan pencarian data riwayat kunjungan secara real-time tanpa perlu membuka tumpukan buku fisik.",
                );
                columns[1].label(RichText::new("📸 Bukti Digital Valid").strong());
                columns[1].label(
                    "Mencatat kehadiran tamu lengkap dengan foto wajah dan tanda tangan digital untuk keamanan dan validitas data administrasi sekolah.",
                );
            });
        });
    }

    pub(crate) fn show_success_overlay(&mut self, ctx: &egui::Context) {
        let Some(message) = self.nav.success_message.clone() else {
            return;
        };

        let mut dismiss = false;
        egui::Modal::new(egui::Id::new("visit-success")).show(ctx, |ui| {
            ui.set_width(360.0);
            ui.vertical_centered(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(64.0, 64.0), egui::Sense::hover());
                ui.painter()
                    .circle_filled(rect.center(), 32.0, theme::SUCCESS_FILL);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "✔",
                    egui::FontId::proportional(30.0),
                    theme::SUCCESS_ICON,
                );
                ui.add_space(8.0);
                ui.label(
                    RichText::new("Terima Kasih!")
                        .size(22.0)
                        .strong()
                        .color(theme::TEXT_STRONG),
                );
                ui.label(RichText::new(&message).color(theme::TEXT_MUTED));
                ui.add_space(12.0);
                let button = widgets::primary_button("Lihat Daftar Tamu", true)
                    .min_size(egui::vec2(ui.available_width(), 44.0));
                if ui.add(button).clicked() {
                    dismiss = true;
                }
            });
        });

        if dismiss {
            self.apply(NavAction::DismissSuccess);
        }
    }
}
