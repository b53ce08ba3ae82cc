//! AWS API access: SDK client construction and the calls each
//! resource/data source makes, behind traits so tests can fake them.

pub mod client;
pub mod cur;
pub mod error;
pub mod route53resolver;

#[cfg(test)]
pub mod test_helpers;

pub use client::{ClientConfig, Clients};
pub use cur::{find_report_definition, CurReportDefinition, ReportDefinitionApi};
pub use error::ApiError;
pub use route53resolver::ResolverApi;
