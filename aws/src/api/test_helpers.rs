//! In-memory fakes of the API traits

use async_trait::async_trait;
use aws_sdk_route53resolver::types::{Filter, IpAddressResponse, ResolverEndpoint};
use std::sync::Mutex;

use super::cur::{
    CurReportDefinition, ReportDefinitionApi, ReportDefinitionPage, DEFAULT_REPORT_VERSIONING,
};
use super::error::ApiError;
use super::route53resolver::ResolverApi;

pub fn endpoint(id: &str, name: &str) -> ResolverEndpoint {
    ResolverEndpoint::builder()
        .id(id)
        .arn(format!(
            "arn:aws:route53resolver:us-east-1:123456789012:resolver-endpoint/{}",
            id
        ))
        .host_vpc_id("vpc-1")
        .name(name)
        .security_group_ids("sg-1")
        .build()
}

pub fn ip(address: &str) -> IpAddressResponse {
    IpAddressResponse::builder().ip(address).build()
}

/// Canned responses plus a log of every call made
#[derive(Default)]
pub struct FakeResolver {
    pub endpoints: Vec<ResolverEndpoint>,
    pub ip_addresses: Vec<IpAddressResponse>,
    pub fail_list: bool,
    pub list_calls: Mutex<Vec<Vec<Filter>>>,
    pub ip_calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new(endpoints: Vec<ResolverEndpoint>, ip_addresses: Vec<IpAddressResponse>) -> Self {
        Self {
            endpoints,
            ip_addresses,
            ..Default::default()
        }
    }

    pub fn ip_calls(&self) -> Vec<String> {
        self.ip_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<Vec<Filter>> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResolverApi for FakeResolver {
    async fn list_resolver_endpoints(
        &self,
        filters: Vec<Filter>,
    ) -> Result<Vec<ResolverEndpoint>, ApiError> {
        self.list_calls.lock().unwrap().push(filters);
        if self.fail_list {
            return Err(ApiError::RemoteCallFailed {
                operation: "ListResolverEndpoints",
                message: "AccessDeniedException: not authorized".to_string(),
            });
        }
        Ok(self.endpoints.clone())
    }

    async fn list_resolver_endpoint_ip_addresses(
        &self,
        resolver_endpoint_id: &str,
    ) -> Result<Vec<IpAddressResponse>, ApiError> {
        self.ip_calls
            .lock()
            .unwrap()
            .push(resolver_endpoint_id.to_string());
        Ok(self.ip_addresses.clone())
    }
}

pub fn daily_report(name: &str) -> CurReportDefinition {
    CurReportDefinition {
        report_name: name.to_string(),
        time_unit: "DAILY".to_string(),
        format: "textORcsv".to_string(),
        compression: "GZIP".to_string(),
        additional_schema_elements: vec!["RESOURCES".to_string()],
        s3_bucket: "tf-test-bucket".to_string(),
        s3_prefix: String::new(),
        s3_region: "us-east-1".to_string(),
        additional_artifacts: vec!["REDSHIFT".to_string(), "QUICKSIGHT".to_string()],
        refresh_closed_reports: false,
        report_versioning: DEFAULT_REPORT_VERSIONING.to_string(),
    }
}

/// Stores definitions in memory and serves them `page_size` at a time
pub struct FakeReports {
    pub definitions: Mutex<Vec<CurReportDefinition>>,
    pub page_size: usize,
    pub describe_calls: Mutex<usize>,
}

impl Default for FakeReports {
    fn default() -> Self {
        Self {
            definitions: Mutex::new(Vec::new()),
            page_size: 5,
            describe_calls: Mutex::new(0),
        }
    }
}

impl FakeReports {
    pub fn with(definitions: Vec<CurReportDefinition>) -> Self {
        Self {
            definitions: Mutex::new(definitions),
            ..Default::default()
        }
    }

    pub fn stored(&self, report_name: &str) -> Option<CurReportDefinition> {
        self.definitions
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.report_name == report_name)
            .cloned()
    }
}

#[async_trait]
impl ReportDefinitionApi for FakeReports {
    async fn describe_report_definitions(
        &self,
        next_token: Option<String>,
    ) -> Result<ReportDefinitionPage, ApiError> {
        *self.describe_calls.lock().unwrap() += 1;
        let definitions = self.definitions.lock().unwrap();
        let start: usize = next_token.as_deref().unwrap_or("0").parse().unwrap();
        let end = (start + self.page_size).min(definitions.len());
        Ok(ReportDefinitionPage {
            definitions: definitions[start..end].to_vec(),
            next_token: (end < definitions.len()).then(|| end.to_string()),
        })
    }

    async fn put_report_definition(
        &self,
        definition: &CurReportDefinition,
    ) -> Result<(), ApiError> {
        let mut definitions = self.definitions.lock().unwrap();
        if definitions
            .iter()
            .any(|d| d.report_name == definition.report_name)
        {
            return Err(ApiError::RemoteCallFailed {
                operation: "PutReportDefinition",
                message: "DuplicateReportNameException".to_string(),
            });
        }
        definitions.push(definition.clone());
        Ok(())
    }

    async fn modify_report_definition(
        &self,
        definition: &CurReportDefinition,
    ) -> Result<(), ApiError> {
        let mut definitions = self.definitions.lock().unwrap();
        match definitions
            .iter_mut()
            .find(|d| d.report_name == definition.report_name)
        {
            Some(existing) => {
                *existing = definition.clone();
                Ok(())
            }
            None => Err(ApiError::RemoteCallFailed {
                operation: "ModifyReportDefinition",
                message: "ValidationException: report does not exist".to_string(),
            }),
        }
    }

    async fn delete_report_definition(&self, report_name: &str) -> Result<(), ApiError> {
        self.definitions
            .lock()
            .unwrap()
            .retain(|d| d.report_name != report_name);
        Ok(())
    }
}
