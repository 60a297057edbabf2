pub mod analytics_sink;
pub mod audit_config;
pub mod audit_error;
pub mod audit_issue;
pub mod audit_report;
pub mod auditor_state;
pub mod broken_link_record;
pub mod inspect;
pub mod links;
pub mod page;
mod page_auditor;
pub mod page_metrics;
pub mod score;
pub mod shutdown_signal;

pub use page_auditor::*;
