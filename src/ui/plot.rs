use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use autodash::data::chart::{
    CategoryCount, ChartConfig, ChartKind, ChartSeries, DatePoint, NumericPoint,
};
use autodash::Session;
use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Polygon};

use crate::color::{accent, ColorMap};

const CHART_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render every chart of the session in a two-column grid.
pub fn chart_grid(ui: &mut Ui, session: &Session) {
    if session.dataset().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file or pick a demo template to build a dashboard  (File → Open…)");
        });
        return;
    }

    let charts = session.chart_series();
    if charts.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No chartable columns in this dataset");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (row, pair) in charts.chunks(2).enumerate() {
                ui.columns(2, |cols: &mut [Ui]| {
                    for (col, (config, series)) in pair.iter().enumerate() {
                        let index = row * 2 + col;
                        chart_card(&mut cols[col], index, config, series);
                    }
                });
                ui.add_space(8.0);
            }
        });
}

fn chart_card(ui: &mut Ui, index: usize, config: &ChartConfig, series: &ChartSeries) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(RichText::new(&config.title).strong().size(16.0));
        ui.label(RichText::new(config.subtitle()).weak());

        if series.is_empty() {
            ui.add_sized(
                [ui.available_width(), CHART_HEIGHT],
                egui::Label::new("No data for the current filters"),
            );
            return;
        }

        let plot_id = format!("chart_{index}_{}_{}", config.kind, config.column);
        match (config.kind, series) {
            (ChartKind::Bar, ChartSeries::Categories(counts)) => bar_chart(ui, &plot_id, counts),
            (ChartKind::Pie, ChartSeries::Categories(counts)) => pie_chart(ui, &plot_id, counts),
            (ChartKind::Line, ChartSeries::Values(points)) => {
                line_chart(ui, &plot_id, &config.column, points, accent(index))
            }
            (ChartKind::Area, ChartSeries::Timeline(points)) => {
                area_chart(ui, &plot_id, &config.column, points, accent(index))
            }
            (kind, series) => {
                log::warn!(
                    "No renderer for a {kind} chart over {} points",
                    series.len()
                );
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, id: &str, counts: &[CategoryCount]) {
    let colors = ColorMap::new(counts.iter().map(|c| c.name.as_str()));
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.name)
                .fill(colors.color_for(&c.name))
                .width(0.7)
        })
        .collect();
    let names: Vec<String> = counts.iter().map(|c| c.name.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_tick(&names, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Tick label of a bar: the category name at integer positions only.
fn category_tick(names: &[String], position: f64) -> String {
    if position < 0.0 || position.fract() != 0.0 {
        return String::new();
    }
    names.get(position as usize).cloned().unwrap_or_default()
}

fn pie_chart(ui: &mut Ui, id: &str, counts: &[CategoryCount]) {
    let colors = ColorMap::new(counts.iter().map(|c| c.name.as_str()));
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return;
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for c in counts {
                let sweep = TAU * c.count as f64 / total as f64;
                let color = colors.color_for(&c.name);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(wedge(start, sweep)))
                        .name(format!("{} ({})", c.name, c.count))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::from_gray(30))),
                );
                start += sweep;
            }
        });
}

/// Outline of a unit-circle wedge starting at `start` radians.
fn wedge(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * 64.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        points.push([angle.cos(), angle.sin()]);
    }
    points
}

fn line_chart(ui: &mut Ui, id: &str, column: &str, points: &[NumericPoint], color: Color32) {
    let line_points: PlotPoints = points
        .iter()
        .map(|p| [p.index as f64, p.value])
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Row")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(line_points).name(column).color(color).width(2.0));
        });
}

fn area_chart(ui: &mut Ui, id: &str, column: &str, points: &[DatePoint], color: Color32) {
    let area_points: PlotPoints = points
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.value])
        .collect();
    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
    let hover_labels = labels.clone();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_boxed_zoom(true)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_tick(&labels, mark.value)
        })
        .label_formatter(move |_name: &str, value: &PlotPoint| {
            let i = value.x.round();
            let label = if i >= 0.0 {
                hover_labels.get(i as usize).map(String::as_str).unwrap_or("")
            } else {
                ""
            };
            format!("{label}\n{:.0}", value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(area_points)
                    .name(column)
                    .color(color)
                    .fill(0.0)
                    .width(2.0),
            );
        });
}
