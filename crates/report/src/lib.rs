//! Report composition: turns compared KPIs and alerts into the final
//! structured report and its chat-ready text.

pub mod composer;
pub mod format;
pub mod report;

pub use composer::{ReportComposer, ReportInput};
pub use report::{EntitySummary, Report, ReportSummary};
