//! Resource implementations

pub mod cur_report_definition;

pub use cur_report_definition::CurReportDefinitionResource;
