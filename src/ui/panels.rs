use std::path::PathBuf;

use autodash::data::demo::TEMPLATES;
use autodash::data::filter::DateRange;
use autodash::data::loader::{
    supported_extensions, CSV_EXTENSIONS, EXCEL_EXTENSIONS, JSON_EXTENSIONS, PARQUET_EXTENSIONS,
};
use autodash::data::stats::NumericRange;
use autodash::session::StatusMessage;
use autodash::Session;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, session: &mut Session) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        let active = session.filters().active_count();
        if active > 0 {
            ui.label(RichText::new(format!("{active} active")).color(Color32::LIGHT_BLUE));
        }
    });
    ui.separator();

    if session.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate the session inside the loop.
    let options = session.filter_options().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Category filters (collapsible checklists) ----
            for (idx, cat) in options.categories.iter().enumerate() {
                let selected = session
                    .filters()
                    .categories
                    .get(&cat.column)
                    .cloned()
                    .unwrap_or_default();
                let header_text = if selected.is_empty() {
                    format!("{}  (all)", cat.column)
                } else {
                    format!("{}  ({}/{})", cat.column, selected.len(), cat.values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&cat.column)
                    .default_open(idx < 3)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("All values").clicked() {
                            session.set_category_selection(&cat.column, Default::default());
                        }
                        for value in &cat.values {
                            let mut checked = selected.contains(value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                session.toggle_category_value(&cat.column, value);
                            }
                        }
                    });
            }

            // ---- Numeric range filters ----
            for num in &options.numbers {
                let bounds = num.range;
                let current = session
                    .filters()
                    .numeric_ranges
                    .get(&num.column)
                    .copied();
                let NumericRange { mut min, mut max } = current.unwrap_or(bounds);

                egui::CollapsingHeader::new(RichText::new(&num.column).strong())
                    .id_salt(("numeric", &num.column))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        let lo = ui.add(egui::Slider::new(&mut min, bounds.min..=bounds.max).text("min"));
                        let hi = ui.add(egui::Slider::new(&mut max, bounds.min..=bounds.max).text("max"));
                        if lo.changed() || hi.changed() {
                            session.set_numeric_range(
                                &num.column,
                                NumericRange::new(min.min(max), max.max(min)),
                            );
                        }
                        if current.is_some() && ui.small_button("Clear").clicked() {
                            session.clear_numeric_range(&num.column);
                        }
                    });
            }

            // ---- Global date range ----
            if let Some((first, last)) = options.date_span {
                ui.separator();
                date_range_controls(ui, session, first.date(), last.date());
            }

            // ---- Reset ----
            if session.filters().active_count() > 0 {
                ui.add_space(8.0);
                if ui.button("⟲ Reset all filters").clicked() {
                    session.reset_filters();
                }
            }
        });
}

fn date_range_controls(ui: &mut Ui, session: &mut Session, first: NaiveDate, last: NaiveDate) {
    ui.strong("Date range");
    let current = session.filters().date_range;

    let mut from_on = current.start.is_some();
    let mut from = current.start.map(|d| d.date()).unwrap_or(first);
    let mut to_on = current.end.is_some();
    let mut to = current.end.map(|d| d.date()).unwrap_or(last);
    let mut changed = false;

    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut from_on, "From").changed();
        if from_on {
            changed |= ui
                .add(DatePickerButton::new(&mut from).id_salt("date_from"))
                .changed();
        }
    });
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut to_on, "To").changed();
        if to_on {
            changed |= ui
                .add(DatePickerButton::new(&mut to).id_salt("date_to"))
                .changed();
        }
    });

    if changed {
        session.set_date_range(DateRange {
            start: from_on.then(|| from.and_time(NaiveTime::MIN)),
            end: to_on.then(|| end_of_day(to)),
        });
    }
}

/// Picking a day as the upper bound includes the whole day.
fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns a file the user picked to open.
pub fn top_bar(ui: &mut Ui, session: &mut Session) -> Option<PathBuf> {
    let mut picked = None;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let idle = !session.is_processing();
            if ui.add_enabled(idle, egui::Button::new("Open…")).clicked() {
                picked = open_file_dialog();
                ui.close_menu();
            }
            ui.add_enabled_ui(idle, |ui: &mut Ui| {
                ui.menu_button("Demo templates", |ui: &mut Ui| {
                    for template in TEMPLATES {
                        if ui
                            .button(template.name)
                            .on_hover_text(template.description)
                            .clicked()
                        {
                            // Refusal is logged by the session.
                            let _ = session.load_template(template);
                            ui.close_menu();
                        }
                    }
                });
            });
            if ui
                .add_enabled(session.dataset().is_some(), egui::Button::new("Clear"))
                .clicked()
            {
                session.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if session.is_processing() {
            ui.spinner();
            ui.label("Processing file…");
        } else if let Some(ds) = session.dataset() {
            ui.label(format!(
                "{}: {} of {} rows, {} columns, {} charts",
                session.source_name().unwrap_or("dataset"),
                session.filtered_rows().len(),
                ds.len(),
                ds.columns.len(),
                session.chart_configs().len()
            ));
        }

        ui.separator();

        match session.status_message() {
            Some(StatusMessage::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(StatusMessage::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
            }
            None => {}
        }
    });
    picked
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open data file")
        .add_filter("Supported files", &supported_extensions())
        .add_filter("CSV", CSV_EXTENSIONS)
        .add_filter("Excel", EXCEL_EXTENSIONS)
        .add_filter("JSON", JSON_EXTENSIONS)
        .add_filter("Parquet", PARQUET_EXTENSIONS)
        .pick_file()
}
