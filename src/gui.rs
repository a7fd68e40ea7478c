use std::time::Instant;

use eframe::egui;
use image::RgbImage;
use log::warn;

use crate::camera::NokhwaBackend;
use crate::capture::CaptureConfig;
use crate::constants::gui::{
    MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, PREVIEW_PLACEHOLDER_HEIGHT, WINDOW_HEIGHT, WINDOW_TITLE,
    WINDOW_WIDTH,
};
use crate::frame_loop::FrameTimer;
use crate::presets::Resolution;
use crate::session::{AutoCapture, CaptureSession, CaptureStatus};

pub struct CaptureApp {
    session: CaptureSession<NokhwaBackend>,
    timer: FrameTimer,
    preview: Option<egui::TextureHandle>,
}

impl CaptureApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut session = CaptureSession::new(NokhwaBackend, CaptureConfig::default());

        if !session.start() {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description("No camera found!")
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        }

        Self {
            session,
            timer: FrameTimer::new(Instant::now()),
            preview: None,
        }
    }

    fn run_due_tick(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if !self.timer.is_due(now) {
            return;
        }

        let outcome = self.session.tick();
        if let Some(frame) = outcome.preview {
            self.show_frame(ctx, &frame);
        }
        self.timer.schedule(now, outcome.next_tick);
    }

    fn show_frame(&mut self, ctx: &egui::Context, frame: &RgbImage) {
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgb(size, frame.as_raw());

        match &mut self.preview {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.preview =
                    Some(ctx.load_texture("camera_preview", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn preview_ui(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = &self.preview else {
            ui.allocate_ui(egui::vec2(ui.available_width(), PREVIEW_PLACEHOLDER_HEIGHT), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("No camera image");
                });
            });
            return;
        };

        let [width, height] = texture.size();
        let response = ui.add(
            egui::Image::from_texture(texture)
                .shrink_to_fit()
                .sense(egui::Sense::click_and_drag()),
        );

        let frame_size = (width as u32, height as u32);
        let to_pixel = |pos: egui::Pos2| frame_pixel(response.rect, pos, frame_size);

        if response.drag_started() {
            if let Some(pos) = ui.input(|i| i.pointer.press_origin()) {
                let (x, y) = to_pixel(pos);
                self.session.crop_press(x, y);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = to_pixel(pos);
                self.session.crop_motion(x, y);
            }
        }
        if response.drag_stopped() {
            let pos = response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.latest_pos()));
            if let Some(pos) = pos {
                let (x, y) = to_pixel(pos);
                self.session.crop_release(x, y);
            }
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Camera:");
                let cameras = self.session.available_cameras().to_vec();
                let active = self.session.active_camera();
                let mut selected = None;

                egui::ComboBox::from_id_salt("camera_selector")
                    .selected_text(match active {
                        Some(index) => index.to_string(),
                        None => "None".to_string(),
                    })
                    .show_ui(ui, |ui| {
                        for index in cameras {
                            if ui
                                .selectable_label(active == Some(index), index.to_string())
                                .clicked()
                            {
                                selected = Some(index);
                            }
                        }
                    });

                if let Some(index) = selected {
                    if let Err(e) = self.session.select_camera(index) {
                        warn!("Failed to switch camera: {}", e);
                    }
                }

                ui.add_space(10.0);
                ui.label("Image Size:");
                let mut resolution = self.session.config.resolution;
                egui::ComboBox::from_id_salt("resolution_selector")
                    .selected_text(resolution.label())
                    .show_ui(ui, |ui| {
                        for option in Resolution::ALL {
                            ui.selectable_value(&mut resolution, option, option.label());
                        }
                    });
                self.session.set_resolution(resolution);

                ui.add_space(10.0);
                let mut crop_enabled = self.session.config.crop_enabled;
                if ui.checkbox(&mut crop_enabled, "Enable Crop").changed() {
                    self.session.set_crop_enabled(crop_enabled);
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Select Folder").clicked() {
                    let picked = rfd::FileDialog::new()
                        .set_directory(&self.session.config.output_dir)
                        .pick_folder();
                    if let Some(folder) = picked {
                        self.session.set_output_dir(folder);
                    }
                }
                ui.label(self.session.config.output_dir.display().to_string());
            });
        });

        ui.add_space(10.0);

        let running = self.session.auto_capture() == AutoCapture::Running;
        ui.horizontal(|ui| {
            if ui.button("📷 Capture Image").clicked() {
                // errors are already reflected in the status line
                let _ = self.session.capture_once();
            }

            if ui
                .add_enabled(!running, egui::Button::new("▶ Start Auto Capture"))
                .clicked()
            {
                self.session.start_auto_capture();
            }

            if ui.add_enabled(running, egui::Button::new("⏹ Stop")).clicked() {
                self.session.stop_auto_capture();
            }
        });
    }

    fn status_ui(&self, ui: &mut egui::Ui) {
        if self.session.auto_capture() == AutoCapture::Running {
            ui.colored_label(egui::Color32::BLUE, "⏳ Auto capture running");
        }

        match self.session.status() {
            CaptureStatus::Idle => {
                ui.label("Ready to capture");
            }
            CaptureStatus::Saved(path) => {
                ui.colored_label(
                    egui::Color32::GREEN,
                    format!("✓ Saved {}", path.display()),
                );
            }
            CaptureStatus::Error(msg) => {
                ui.colored_label(egui::Color32::RED, format!("✗ {}", msg));
            }
        }
    }
}

/// Maps a widget position onto the frame shown in `rect`, clamped to the frame.
fn frame_pixel(rect: egui::Rect, pos: egui::Pos2, frame_size: (u32, u32)) -> (i32, i32) {
    let (width, height) = (frame_size.0 as f32, frame_size.1 as f32);
    let x = (pos.x - rect.min.x) * width / rect.width().max(1.0);
    let y = (pos.y - rect.min.y) * height / rect.height().max(1.0);
    (
        x.round().clamp(0.0, width) as i32,
        y.round().clamp(0.0, height) as i32,
    )
}

impl eframe::App for CaptureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_due_tick(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    self.preview_ui(ui);
                });

                ui.add_space(10.0);
                ui.separator();
                ui.add_space(10.0);

                self.controls_ui(ui);

                ui.add_space(10.0);
                self.status_ui(ui);
            });
        });

        ctx.request_repaint_after(self.timer.remaining(Instant::now()));
    }
}

impl Drop for CaptureApp {
    fn drop(&mut self) {
        self.session.shutdown();
    }
}

pub fn run_gui() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(CaptureApp::new(cc)))),
    )
}
