//! Provider data structure passed to resources and data sources

use crate::api::{Clients, ReportDefinitionApi, ResolverApi};
use std::sync::Arc;

#[derive(Clone)]
pub struct AwsProviderData {
    pub resolver: Arc<dyn ResolverApi>,
    pub reports: Arc<dyn ReportDefinitionApi>,
}

impl AwsProviderData {
    pub fn new(clients: Clients) -> Self {
        Self {
            resolver: Arc::new(clients.route53resolver),
            reports: Arc::new(clients.costandusagereport),
        }
    }

    /// Any implementation of the API traits, e.g. in-memory fakes
    pub fn with_apis(resolver: Arc<dyn ResolverApi>, reports: Arc<dyn ReportDefinitionApi>) -> Self {
        Self { resolver, reports }
    }
}
