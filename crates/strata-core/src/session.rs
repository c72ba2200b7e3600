//! Session: one query run at a time against a shared, immutable index.
//!
//! A run is gather → weed → compose. The caller owns the [`Query`] and the
//! [`ViewState`]; a run reads both and hands back a new `ViewState` inside
//! its [`RunOutcome`] instead of mutating anything shared. Every buffer of a
//! run is freshly allocated and owned by the outcome.
//!
//! Runs on one session must be serialized by the caller. Each runs to
//! completion or failure; there is no cancellation.

use crate::compose::{compose, Cursor, Reflow, ResultTree};
use crate::config::Config;
use crate::error::{LayerError, SearchError};
use crate::export::{tabulate, ExportTable};
use crate::gather::{gather, Gathered};
use crate::index::CorpusIndex;
use crate::query::Query;
use crate::render::{DisplayRow, RenderContext, VisibleLayers};
use crate::types::NodeType;
use crate::weed::{weed, Statistics, Weeded};
use std::sync::Arc;

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    /// At least one layer failed; results cover everything that succeeded.
    Failed,
}

/// Reported to the progress callback around each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Gathering,
    Weeding,
    Composing,
    Done,
    Failed,
}

/// Caller-facing state that persists between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub container: NodeType,
    pub visible: VisibleLayers,
    pub cursor: Cursor,
    /// The query changed since the last run.
    pub dirty: bool,
    /// Number of results in the last composition.
    pub result_count: usize,
}

impl ViewState {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub stats: Statistics,
    pub errors: Vec<LayerError>,
    pub gathered: Gathered,
    pub weeded: Weeded,
    pub results: Vec<ResultTree>,
    /// State to pass into the next run.
    pub view: ViewState,
}

pub struct Session {
    index: Arc<CorpusIndex>,
    config: Config,
}

impl Session {
    pub fn new(index: Arc<CorpusIndex>, config: Config) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// State before the first run: the default container type, the
    /// configured visible layers, no focus, dirty.
    pub fn initial_view(&self) -> ViewState {
        ViewState {
            container: self.config.default_container(),
            visible: VisibleLayers::from_index(&self.index),
            cursor: Cursor::default(),
            dirty: true,
            result_count: 0,
        }
    }

    pub fn run(&self, query: &Query, view: &ViewState) -> Result<RunOutcome, SearchError> {
        self.run_with_progress(query, view, |_| {})
    }

    /// Run a query, reporting each phase to `progress`.
    ///
    /// Fails only on [`SearchError::IndexCorruption`]; per-layer errors are
    /// collected in the outcome and make its status [`RunStatus::Failed`].
    pub fn run_with_progress(
        &self,
        query: &Query,
        view: &ViewState,
        mut progress: impl FnMut(Progress),
    ) -> Result<RunOutcome, SearchError> {
        let result = self.execute(query, view, &mut progress);
        match &result {
            Ok(outcome) if outcome.status == RunStatus::Done => progress(Progress::Done),
            Ok(_) => progress(Progress::Failed),
            Err(error) => {
                tracing::error!(%error, "query run aborted");
                progress(Progress::Failed);
            }
        }
        result
    }

    fn execute(
        &self,
        query: &Query,
        view: &ViewState,
        progress: &mut impl FnMut(Progress),
    ) -> Result<RunOutcome, SearchError> {
        progress(Progress::Gathering);
        let mut gathered = gather(&self.index, query, self.config.search.max_pattern_length);
        let errors = std::mem::take(&mut gathered.errors);

        progress(Progress::Weeding);
        let weeded = weed(&self.index, gathered.node_sets())?;
        let stats = weeded.statistics(&self.index);

        progress(Progress::Composing);
        let results = compose(&self.index, &weeded, view.container)?;
        let reflow = if view.dirty { Reflow::Reset } else { Reflow::Keep };
        let cursor = view.cursor.reflow(results.len(), reflow);

        let status = if errors.is_empty() {
            RunStatus::Done
        } else {
            RunStatus::Failed
        };
        tracing::info!(
            results = results.len(),
            errors = errors.len(),
            ?status,
            "query run finished"
        );

        Ok(RunOutcome {
            status,
            stats,
            errors,
            gathered,
            weeded,
            view: ViewState {
                container: view.container,
                visible: view.visible.clone(),
                cursor,
                dirty: false,
                result_count: results.len(),
            },
            results,
        })
    }

    /// Compose the same reconciled results around another container type,
    /// scaling the focus to the new number of results.
    pub fn recompose(
        &self,
        mut outcome: RunOutcome,
        container: NodeType,
    ) -> Result<RunOutcome, SearchError> {
        let results = compose(&self.index, &outcome.weeded, container)?;
        let reflow = Reflow::Rescale {
            old_count: outcome.view.result_count,
        };
        outcome.view.cursor = outcome.view.cursor.reflow(results.len(), reflow);
        outcome.view.container = container;
        outcome.view.result_count = results.len();
        outcome.results = results;
        Ok(outcome)
    }

    pub fn context<'a>(&'a self, outcome: &'a RunOutcome) -> RenderContext<'a> {
        RenderContext {
            index: &self.index,
            settings: &self.config.search,
            gathered: &outcome.gathered,
            weeded: &outcome.weeded,
            visible: &outcome.view.visible,
        }
    }

    /// Display rows around the outcome's focus.
    pub fn display(&self, outcome: &RunOutcome) -> Vec<DisplayRow> {
        self.context(outcome).rows(&outcome.results, outcome.view.cursor)
    }

    pub fn export(&self, outcome: &RunOutcome) -> ExportTable {
        tabulate(&self.context(outcome))
    }
}
