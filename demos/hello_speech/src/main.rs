#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use egui_speech::{SpeechToggle, SystemSpeech};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 260.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Hello speech",
        options,
        Box::new(|_cc| Ok(Box::<HelloSpeech>::default())),
    )
}

struct HelloSpeech {
    speech: SystemSpeech,
    text: String,
}

impl Default for HelloSpeech {
    fn default() -> Self {
        Self {
            speech: SystemSpeech::new(),
            text: "It is surprisingly fun to make the computer talk.".to_owned(),
        }
    }
}

impl eframe::App for HelloSpeech {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Text to speech");

            ui.text_edit_multiline(&mut self.text);
            ui.add(SpeechToggle::new(&mut self.speech, &self.text).id("editor"));

            ui.separator();

            // A second toggle on the same engine: clicking it while the
            // first one is playing takes the speech over.
            ui.add(
                SpeechToggle::new(&mut self.speech, "This is the other speaker, butting in.")
                    .id("rival")
                    .start_icon("Read the other text")
                    .stop_icon("Stop the other text")
                    .rate(6),
            );
        });
    }
}
