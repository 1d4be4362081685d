// dashboard/session.rs

use crate::analyzer::AnalysisReport;
use crate::pipeline::{BatchOutcome, NewsFeed};
use std::fmt;

/// Which sections of the dashboard are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    DataFetched,
    AnalysisShown,
}

/// Named user actions that move the dashboard between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FetchRequested,
    AnalysisRequested,
    ResetRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: Stage,
    pub action: Action,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from, self.action) {
            (Stage::Idle, Action::AnalysisRequested) => write!(f, "fetch stock data first"),
            (from, action) => write!(f, "{:?} is not allowed while {:?}", action, from),
        }
    }
}

impl Stage {
    pub fn next(self, action: Action) -> Result<Stage, TransitionError> {
        match (self, action) {
            (_, Action::ResetRequested) => Ok(Stage::Idle),
            (_, Action::FetchRequested) => Ok(Stage::DataFetched),
            (Stage::Idle, Action::AnalysisRequested) => Err(TransitionError { from: self, action }),
            (Stage::DataFetched | Stage::AnalysisShown, Action::AnalysisRequested) => Ok(Stage::AnalysisShown),
        }
    }
}

/// Per-process dashboard state. Results are replaced wholesale on every fetch.
#[derive(Debug)]
pub struct Session {
    stage: Stage,
    outcome: Option<BatchOutcome>,
    report: Option<AnalysisReport>,
    news: Vec<NewsFeed>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            outcome: None,
            report: None,
            news: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn outcome(&self) -> Option<&BatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn news(&self) -> &[NewsFeed] {
        &self.news
    }

    pub fn apply(&mut self, action: Action) -> Result<Stage, TransitionError> {
        let next = self.stage.next(action)?;
        if action == Action::ResetRequested {
            self.outcome = None;
            self.report = None;
            self.news.clear();
        }
        self.stage = next;
        Ok(next)
    }

    /// Stores a successful fetch and its analysis.
    pub fn load(&mut self, outcome: BatchOutcome, report: AnalysisReport) -> Result<Stage, TransitionError> {
        let stage = self.apply(Action::FetchRequested)?;
        self.outcome = Some(outcome);
        self.report = Some(report);
        self.news.clear();
        Ok(stage)
    }

    /// Swaps in a recomputed report for the current data, e.g. after new MA windows.
    pub fn replace_report(&mut self, report: AnalysisReport) {
        if self.outcome.is_some() {
            self.report = Some(report);
        }
    }

    pub fn set_news(&mut self, news: Vec<NewsFeed>) {
        self.news = news;
    }

    /// A fetch that produced nothing usable supersedes the previous result.
    pub fn clear(&mut self) {
        self.stage = Stage::Idle;
        self.outcome = None;
        self.report = None;
        self.news.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
