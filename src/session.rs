use std::collections::BTreeSet;

use crate::data::chart::{aggregate, chart_configs, ChartConfig, ChartSeries};
use crate::data::demo::DemoTemplate;
use crate::data::filter::{filtered_indices, DateRange, FilterState};
use crate::data::stats::{FilterOptions, NumericRange};
use crate::data::value::{Dataset, Row};
use crate::error::LoadError;
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Message shown to the user after a load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// Proof that a load was started. Results from a ticket issued before the
/// last [`Session::clear`] are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub label: String,
}

/// The single working set: current dataset, filter state and everything
/// derived from them, independent of rendering.
///
/// Every mutation replaces the derived state before returning, so readers
/// never see a dataset paired with another dataset's filters or options.
#[derive(Debug, Default)]
pub struct Session {
    settings: Settings,

    /// Loaded dataset (None until a file or template is loaded).
    dataset: Option<Dataset>,

    /// Name of the file or template the dataset came from.
    source_name: Option<String>,

    filters: FilterState,

    /// Filter bounds for the current dataset (cached, filter-independent).
    options: FilterOptions,

    /// Charts for the current schema (cached).
    charts: Vec<ChartConfig>,

    /// Indices of rows passing the current filters (cached).
    visible_indices: Vec<usize>,

    status_message: Option<StatusMessage>,

    /// Whether a file is being decoded.
    processing: bool,

    generation: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn chart_configs(&self) -> &[ChartConfig] {
        &self.charts
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status_message.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    // -- Loading --

    /// Mark a file as being decoded. Only one decode may be pending.
    pub fn begin_load(&mut self, label: impl Into<String>) -> Result<LoadTicket, LoadError> {
        let label = label.into();
        if self.processing {
            log::warn!("Ignoring '{label}': another file is still being processed");
            return Err(LoadError::Busy);
        }
        self.processing = true;
        Ok(LoadTicket {
            generation: self.generation,
            label,
        })
    }

    /// Apply the outcome of a decode started with [`Session::begin_load`].
    ///
    /// Returns `true` when a new dataset became current. On failure the
    /// previous dataset stays current and the message is kept for display.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Dataset, LoadError>,
    ) -> bool {
        self.processing = false;
        if ticket.generation != self.generation {
            log::info!("Discarding result for '{}' after clear", ticket.label);
            return false;
        }
        match result {
            Ok(dataset) => {
                self.load_dataset(dataset, ticket.label);
                true
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", ticket.label);
                self.status_message = Some(StatusMessage::Error(e.to_string()));
                false
            }
        }
    }

    /// Make `dataset` current and reset the filters to neutral.
    pub fn load_dataset(&mut self, dataset: Dataset, source_name: impl Into<String>) {
        let source_name = source_name.into();
        log::info!(
            "Loaded '{source_name}': {} rows with columns {:?}",
            dataset.len(),
            dataset.columns
        );
        self.status_message = Some(StatusMessage::Info(format!(
            "Loaded {} rows with {} columns.",
            dataset.len(),
            dataset.columns.len()
        )));
        self.options = FilterOptions::build(&dataset, &self.settings.filters);
        self.charts = chart_configs(&dataset.schema, &self.settings.charts);
        self.filters = FilterState::default();
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        self.source_name = Some(source_name);
    }

    /// Load a built-in template. Refused while a file is being decoded, since
    /// the decode result would replace it on arrival.
    pub fn load_template(&mut self, template: &DemoTemplate) -> Result<(), LoadError> {
        if self.processing {
            log::warn!("Ignoring template '{}': a file is still being processed", template.id);
            return Err(LoadError::Busy);
        }
        self.load_dataset(template.dataset(), template.name);
        Ok(())
    }

    /// Forget the current dataset. A decode in flight keeps running but its
    /// result will be dropped.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.dataset = None;
        self.source_name = None;
        self.status_message = None;
        self.options = FilterOptions::default();
        self.charts.clear();
        self.filters = FilterState::default();
        self.visible_indices.clear();
    }

    // -- Filters --

    /// Recompute `visible_indices` after filter change.
    fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(&ds.rows, &self.filters, &ds.schema);
        }
    }

    /// Replace the allow-list of a category column; an empty set lifts it.
    pub fn set_category_selection(&mut self, column: &str, values: BTreeSet<String>) {
        if values.is_empty() {
            self.filters.categories.remove(column);
        } else {
            self.filters.categories.insert(column.to_string(), values);
        }
        self.refilter();
    }

    /// Toggle a single value in a column's allow-list.
    pub fn toggle_category_value(&mut self, column: &str, value: &str) {
        let selected = self
            .filters
            .categories
            .entry(column.to_string())
            .or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        if selected.is_empty() {
            self.filters.categories.remove(column);
        }
        self.refilter();
    }

    pub fn set_numeric_range(&mut self, column: &str, range: NumericRange) {
        self.filters
            .numeric_ranges
            .insert(column.to_string(), range);
        self.refilter();
    }

    pub fn clear_numeric_range(&mut self, column: &str) {
        self.filters.numeric_ranges.remove(column);
        self.refilter();
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.filters.date_range = range;
        self.refilter();
    }

    /// Back to the neutral filter state.
    pub fn reset_filters(&mut self) {
        log::debug!("Resetting {} active filters", self.filters.active_count());
        self.filters = FilterState::default();
        self.refilter();
    }

    // -- Derived views --

    /// Rows passing the current filters, in source order.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        match &self.dataset {
            Some(ds) => self.visible_indices.iter().map(|&i| &ds.rows[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Every chart with its series over the current filtered rows.
    pub fn chart_series(&self) -> Vec<(&ChartConfig, ChartSeries)> {
        let rows = self.filtered_rows();
        self.charts
            .iter()
            .map(|config| (config, aggregate(config, &rows, &self.settings.charts)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo;
    use crate::data::schema::{ColumnType, Schema};
    use crate::data::value::Value;

    fn cities() -> Dataset {
        let rows: Vec<Row> = [("NYC", 100.0), ("LA", 200.0), ("NYC", 150.0)]
            .iter()
            .map(|(city, pop)| {
                Row::from([
                    ("city".to_string(), Value::from(*city)),
                    ("pop".to_string(), Value::Number(*pop)),
                ])
            })
            .collect();
        let schema: Schema = [("city", ColumnType::Category), ("pop", ColumnType::Number)]
            .into_iter()
            .collect();
        Dataset::new(rows, vec!["city".into(), "pop".into()], schema)
    }

    #[test]
    fn second_load_is_rejected_while_processing() {
        let mut session = Session::default();
        let ticket = session.begin_load("a.csv").unwrap();
        assert!(session.is_processing());
        assert!(matches!(session.begin_load("b.csv"), Err(LoadError::Busy)));

        assert!(session.finish_load(ticket, Ok(cities())));
        assert!(!session.is_processing());
        assert_eq!(session.source_name(), Some("a.csv"));
        assert!(session.begin_load("b.csv").is_ok());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut session = Session::default();
        session.load_dataset(cities(), "cities");
        let ticket = session.begin_load("broken.csv").unwrap();
        let applied = session.finish_load(ticket, Err(LoadError::Parse("bad row".into())));

        assert!(!applied);
        assert_eq!(session.dataset().map(Dataset::len), Some(3));
        assert_eq!(session.source_name(), Some("cities"));
        assert_eq!(
            session.status_message(),
            Some(&StatusMessage::Error("bad row".into()))
        );
    }

    #[test]
    fn loading_resets_filters() {
        let mut session = Session::default();
        session.load_dataset(cities(), "cities");
        session.toggle_category_value("city", "NYC");
        session.set_numeric_range("pop", NumericRange::new(0.0, 120.0));
        assert_eq!(session.filtered_rows().len(), 1);

        let template = demo::find("sales").unwrap();
        session.load_dataset(template.dataset(), template.name);
        assert!(session.filters().is_neutral());
        assert_eq!(session.filtered_rows().len(), session.dataset().unwrap().len());
    }

    #[test]
    fn template_is_refused_while_processing() {
        let mut session = Session::default();
        let template = demo::find("sales").unwrap();
        let ticket = session.begin_load("orders.csv").unwrap();

        assert!(matches!(session.load_template(template), Err(LoadError::Busy)));
        assert!(session.dataset().is_none());

        assert!(session.finish_load(ticket, Ok(cities())));
        assert_eq!(session.source_name(), Some("orders.csv"));

        session.load_template(template).unwrap();
        assert_eq!(session.source_name(), Some(template.name));
    }

    #[test]
    fn clear_discards_in_flight_result() {
        let mut session = Session::default();
        let ticket = session.begin_load("slow.csv").unwrap();
        session.clear();
        assert!(session.is_processing());

        assert!(!session.finish_load(ticket, Ok(cities())));
        assert!(session.dataset().is_none());
        assert!(!session.is_processing());
    }

    #[test]
    fn toggling_last_value_lifts_the_restriction() {
        let mut session = Session::default();
        session.load_dataset(cities(), "cities");
        session.toggle_category_value("city", "LA");
        assert_eq!(session.filtered_rows().len(), 1);
        session.toggle_category_value("city", "LA");
        assert!(session.filters().categories.is_empty());
        assert_eq!(session.filtered_rows().len(), 3);
    }

    #[test]
    fn derived_state_tracks_the_dataset() {
        let mut session = Session::default();
        session.load_dataset(cities(), "cities");
        assert_eq!(session.filter_options().categories.len(), 1);
        assert_eq!(session.filter_options().numbers.len(), 1);
        let kinds: Vec<_> = session.chart_configs().iter().map(|c| c.kind).collect();
        assert_eq!(kinds.len(), 3);

        let series = session.chart_series();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|(_, s)| !s.is_empty()));
    }
}
