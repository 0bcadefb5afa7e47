use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use autodash::data::loader::load_file;
use autodash::data::value::Dataset;
use autodash::session::LoadTicket;
use autodash::{LoadError, Session, Settings};
use eframe::egui;

use crate::ui::{panels, plot};

/// A decode running on a worker thread.
struct PendingLoad {
    ticket: LoadTicket,
    rx: Receiver<Result<Dataset, LoadError>>,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AutodashApp {
    pub session: Session,
    pending: Option<PendingLoad>,
}

impl AutodashApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            session: Session::new(settings),
            pending: None,
        }
    }

    /// Decode `path` off the UI thread. Ignored while another decode is
    /// pending.
    pub fn start_load(&mut self, path: PathBuf, ctx: &egui::Context) {
        let ticket = match self.session.begin_load(display_name(&path)) {
            Ok(ticket) => ticket,
            Err(_) => return,
        };
        let (tx, rx) = mpsc::channel();
        let settings = self.session.settings().inference;
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = load_file(&path, &settings);
            // The receiver is gone only if the app is shutting down.
            let _ = tx.send(result);
            ctx.request_repaint();
        });
        self.pending = Some(PendingLoad { ticket, rx });
    }

    /// Hand a finished decode to the session.
    fn poll_load(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(LoadError::Parse("The loader stopped unexpectedly.".to_string()))
            }
        };
        if let Some(pending) = self.pending.take() {
            self.session.finish_load(pending.ticket, result);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.start_load(path, ctx);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for AutodashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            if let Some(path) = panels::top_bar(ui, &mut self.session) {
                self.start_load(path, ctx);
            }
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_grid(ui, &self.session);
        });
    }
}
