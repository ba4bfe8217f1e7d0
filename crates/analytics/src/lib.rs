//! `stockcurve-analytics`
//!
//! **Responsibility:** deterministic catalog analytics over an in-memory
//! snapshot.
//!
//! Everything here is a pure function of its input:
//! - it never performs IO and never touches a store;
//! - the classifier *proposes* curve labels as updates, it does not persist them;
//! - reports are typed records, mapped to JSON by the API layer.

pub mod classifier;
pub mod dashboard;
pub mod duplicates;
pub mod profitability;

pub use classifier::{Classification, ClassifierConfig, RankedProduct, ZeroTotalPolicy, classify};
pub use dashboard::{
    CurveCounts, DEFAULT_TOP_N, DashboardFilter, DashboardSummary, TopProduct, dashboard_summary,
};
pub use duplicates::{DuplicateGroup, DuplicateReport, find_duplicates};
pub use profitability::{
    CurveMember, CurveStats, ProfitShare, aggregate_by_curve, products_in_curve, profit_share,
};
