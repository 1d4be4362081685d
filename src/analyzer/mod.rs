// Analyzer module: aggregates submodules for the derived analytics.

pub mod correlation;
pub mod market_indicators;
pub mod price_analysis;
pub mod returns;
pub mod summary;

// Re-export the main Analyzer implementation for ease of use.
pub use price_analysis::{AnalysisReport, Analyzer, AnalyzerImpl, ColumnSpec, DerivedRow, TickerAnalysis};
