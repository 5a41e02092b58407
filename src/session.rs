//! Session State
//! Everything one user session holds: the loaded dataset, its summary, the
//! current filter and the current chart selection. Every change recomputes
//! the derived views synchronously.

use crate::charts::{ChartData, ChartInputError, ChartKind, ChartSpec};
use crate::data::{DataFilter, DataLoader, Dataset, FilterPredicate, LoaderError};
use crate::stats::{StatsCalculator, SummaryStats};
use std::path::Path;

/// A dataset together with the views derived from it.
pub struct LoadedData {
    pub dataset: Dataset,
    pub summary: SummaryStats,
    pub filter_column: Option<String>,
    pub predicate: Option<FilterPredicate>,
    pub filtered: Dataset,
}

#[derive(Default)]
pub struct Session {
    loader: DataLoader,
    data: Option<LoadedData>,
    chart_spec: ChartSpec,
}

impl Session {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            data: None,
            chart_spec: ChartSpec::default(),
        }
    }

    pub fn data(&self) -> Option<&LoadedData> {
        self.data.as_ref()
    }

    pub fn chart_spec(&self) -> &ChartSpec {
        &self.chart_spec
    }

    /// Parse CSV bytes and replace the current dataset. On failure the
    /// previous dataset is kept.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), LoaderError> {
        let dataset = self.loader.load_csv_bytes(bytes)?;
        self.replace_dataset(dataset);
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), LoaderError> {
        let dataset = self.loader.load_csv_file(path)?;
        self.replace_dataset(dataset);
        Ok(())
    }

    fn replace_dataset(&mut self, dataset: Dataset) {
        let summary = StatsCalculator::describe(&dataset);
        let filter_column = dataset.column_names().into_iter().next();
        let predicate = filter_column
            .as_deref()
            .and_then(|col| FilterPredicate::default_for(&dataset, col));

        self.chart_spec = ChartSpec::with_defaults(self.chart_spec.kind, &dataset);
        self.data = Some(LoadedData {
            filtered: dataset.clone(),
            dataset,
            summary,
            filter_column,
            predicate,
        });
    }

    /// Switch the filter to another column, resetting it to match everything.
    pub fn select_filter_column(&mut self, column: &str) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        let Some(predicate) = FilterPredicate::default_for(&data.dataset, column) else {
            log::debug!("Ignoring unknown filter column '{}'", column);
            return;
        };

        data.filter_column = Some(column.to_string());
        data.predicate = Some(predicate);
        Self::refilter(data);
    }

    /// Replace the predicate on the current filter column.
    pub fn set_predicate(&mut self, predicate: FilterPredicate) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        data.predicate = Some(predicate);
        Self::refilter(data);
    }

    fn refilter(data: &mut LoadedData) {
        data.filtered = match (&data.filter_column, &data.predicate) {
            (Some(column), Some(predicate)) => DataFilter::apply(&data.dataset, column, predicate),
            _ => data.dataset.clone(),
        };
    }

    /// Choose a chart kind; axis selections go back to the first offered columns.
    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        if kind == self.chart_spec.kind {
            return;
        }
        self.chart_spec = match &self.data {
            Some(data) => ChartSpec::with_defaults(kind, &data.dataset),
            None => ChartSpec {
                kind,
                ..ChartSpec::default()
            },
        };
    }

    pub fn set_chart_spec(&mut self, spec: ChartSpec) {
        self.chart_spec = spec;
    }

    /// Chart data for the filtered rows under the current chart selection.
    pub fn chart(&self) -> Result<ChartData, ChartInputError> {
        let data = self.data.as_ref().ok_or(ChartInputError::NoData)?;
        ChartData::prepare(&data.filtered, &self.chart_spec).inspect_err(|e| {
            log::debug!("Chart input rejected: {}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::HistogramBins;
    use crate::data::CsvExporter;
    use std::collections::BTreeSet;

    const SAMPLE: &str = "city,temp,rain\n\
        oslo,3,10\n\
        rome,18,2\n\
        lima,20,0\n\
        oslo,5,12\n\
        cairo,30,0\n\
        rome,21,1\n\
        lima,19,0\n\
        oslo,-2,8\n\
        cairo,33,0\n\
        rome,16,4\n";

    fn session() -> Session {
        let mut session = Session::default();
        session.load_bytes(SAMPLE.as_bytes()).unwrap();
        session
    }

    fn filtered_rows(session: &Session) -> usize {
        session.data().unwrap().filtered.row_count()
    }

    #[test]
    fn load_computes_summary_and_defaults() {
        let session = session();
        let data = session.data().unwrap();
        assert_eq!(data.dataset.row_count(), 10);
        assert_eq!(data.summary.column_count, 3);
        assert_eq!(data.filter_column.as_deref(), Some("city"));
        assert_eq!(filtered_rows(&session), 10);
        assert_eq!(session.chart_spec().y.as_deref(), Some("temp"));
    }

    #[test]
    fn deselecting_half_the_categories() {
        let mut session = session();
        let allowed: BTreeSet<String> = ["oslo", "lima"].iter().map(|s| s.to_string()).collect();
        session.set_predicate(FilterPredicate::Categories {
            allowed,
            include_missing: true,
        });
        // 3 oslo + 2 lima
        assert_eq!(filtered_rows(&session), 5);
        let preview = session.data().unwrap().filtered.preview(200);
        assert_eq!(preview.row_ids, vec![0, 2, 3, 6, 7]);
        // summary is unaffected by filtering
        assert_eq!(session.data().unwrap().summary.row_count, 10);
    }

    #[test]
    fn range_collapsed_to_minimum() {
        let mut session = session();
        session.select_filter_column("temp");
        session.set_predicate(FilterPredicate::Range {
            lo: -2.0,
            hi: -2.0,
            include_missing: true,
        });
        let data = session.data().unwrap();
        assert_eq!(data.filtered.row_count(), 1);
        assert_eq!(
            data.filtered.text_values("city").unwrap(),
            vec![Some("oslo".to_string())]
        );
    }

    #[test]
    fn changing_column_resets_predicate() {
        let mut session = session();
        session.set_predicate(FilterPredicate::Categories {
            allowed: BTreeSet::new(),
            include_missing: false,
        });
        assert_eq!(filtered_rows(&session), 0);

        session.select_filter_column("rain");
        let data = session.data().unwrap();
        assert_eq!(data.filter_column.as_deref(), Some("rain"));
        assert_eq!(
            data.predicate,
            Some(FilterPredicate::Range {
                lo: 0.0,
                hi: 12.0,
                include_missing: true
            })
        );
        assert_eq!(data.filtered.row_count(), 10);
    }

    #[test]
    fn pie_with_numeric_grouping_is_rejected() {
        let mut session = session();
        session.set_chart_kind(ChartKind::Pie);
        let mut spec = session.chart_spec().clone();
        spec.x = Some("temp".into());
        spec.y = Some("rain".into());
        session.set_chart_spec(spec);
        assert!(session.chart().is_err());
    }

    #[test]
    fn pie_sums_filtered_rows() {
        let mut session = session();
        session.set_chart_kind(ChartKind::Pie);
        let mut spec = session.chart_spec().clone();
        spec.y = Some("rain".into());
        session.set_chart_spec(spec);
        match session.chart().unwrap() {
            ChartData::Pie(pie) => assert!((pie.total() - 37.0).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_filter_gives_chart_error_not_panic() {
        let mut session = session();
        session.set_chart_kind(ChartKind::Histogram);
        session.set_predicate(FilterPredicate::Categories {
            allowed: BTreeSet::new(),
            include_missing: false,
        });
        assert_eq!(session.chart(), Err(ChartInputError::NoData));
        let bytes = CsvExporter::to_csv_bytes(&session.data().unwrap().filtered).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().trim_end(), "city,temp,rain");
    }

    #[test]
    fn chart_kind_change_keeps_bins_default() {
        let mut session = session();
        session.set_chart_kind(ChartKind::Histogram);
        assert_eq!(session.chart_spec().bins, HistogramBins::default());
        assert_eq!(session.chart_spec().y.as_deref(), Some("temp"));
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut session = session();
        assert!(session.load_bytes(b"").is_err());
        assert_eq!(session.data().unwrap().dataset.row_count(), 10);
    }

    #[test]
    fn new_upload_replaces_everything() {
        let mut session = session();
        session.select_filter_column("temp");
        session.load_bytes(b"a,b\nx,1\ny,2\n").unwrap();
        let data = session.data().unwrap();
        assert_eq!(data.dataset.row_count(), 2);
        assert_eq!(data.filter_column.as_deref(), Some("a"));
        assert_eq!(data.filtered.row_count(), 2);
    }
}
