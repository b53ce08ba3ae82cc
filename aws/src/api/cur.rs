//! Cost and Usage Report definition API calls

use async_trait::async_trait;
use aws_sdk_costandusagereport::types::{
    AdditionalArtifact, AwsRegion, CompressionFormat, ReportDefinition, ReportFormat,
    ReportVersioning, SchemaElement, TimeUnit,
};

use super::error::ApiError;

pub const DEFAULT_REPORT_VERSIONING: &str = "CREATE_NEW_REPORT";

/// A report definition as the provider sees it: plain strings, so it can
/// be filled from configuration and compared against state without SDK types.
#[derive(Debug, Clone, PartialEq)]
pub struct CurReportDefinition {
    pub report_name: String,
    pub time_unit: String,
    pub format: String,
    pub compression: String,
    pub additional_schema_elements: Vec<String>,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    pub additional_artifacts: Vec<String>,
    pub refresh_closed_reports: bool,
    pub report_versioning: String,
}

impl CurReportDefinition {
    pub fn to_sdk(&self) -> Result<ReportDefinition, ApiError> {
        ReportDefinition::builder()
            .report_name(&self.report_name)
            .time_unit(TimeUnit::from(self.time_unit.as_str()))
            .format(ReportFormat::from(self.format.as_str()))
            .compression(CompressionFormat::from(self.compression.as_str()))
            .set_additional_schema_elements(Some(
                self.additional_schema_elements
                    .iter()
                    .map(|e| SchemaElement::from(e.as_str()))
                    .collect(),
            ))
            .s3_bucket(&self.s3_bucket)
            .s3_prefix(&self.s3_prefix)
            .s3_region(AwsRegion::from(self.s3_region.as_str()))
            .set_additional_artifacts(Some(
                self.additional_artifacts
                    .iter()
                    .map(|a| AdditionalArtifact::from(a.as_str()))
                    .collect(),
            ))
            .refresh_closed_reports(self.refresh_closed_reports)
            .report_versioning(ReportVersioning::from(self.report_versioning.as_str()))
            .build()
            .map_err(|e| ApiError::InvalidConfiguration(e.to_string()))
    }
}

impl From<&ReportDefinition> for CurReportDefinition {
    fn from(def: &ReportDefinition) -> Self {
        Self {
            report_name: def.report_name().to_string(),
            time_unit: def.time_unit().as_str().to_string(),
            format: def.format().as_str().to_string(),
            compression: def.compression().as_str().to_string(),
            additional_schema_elements: def
                .additional_schema_elements()
                .iter()
                .map(|e| e.as_str().to_string())
                .collect(),
            s3_bucket: def.s3_bucket().to_string(),
            s3_prefix: def.s3_prefix().to_string(),
            s3_region: def.s3_region().as_str().to_string(),
            additional_artifacts: def
                .additional_artifacts()
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            refresh_closed_reports: def.refresh_closed_reports().unwrap_or(true),
            report_versioning: def
                .report_versioning()
                .map(|v| v.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_REPORT_VERSIONING.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportDefinitionPage {
    pub definitions: Vec<CurReportDefinition>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait ReportDefinitionApi: Send + Sync {
    async fn describe_report_definitions(
        &self,
        next_token: Option<String>,
    ) -> Result<ReportDefinitionPage, ApiError>;

    async fn put_report_definition(&self, definition: &CurReportDefinition)
        -> Result<(), ApiError>;

    /// Replaces the definition stored under `definition.report_name`
    async fn modify_report_definition(
        &self,
        definition: &CurReportDefinition,
    ) -> Result<(), ApiError>;

    async fn delete_report_definition(&self, report_name: &str) -> Result<(), ApiError>;
}

/// Walks every describe page looking for `report_name`. `None` means the
/// definition does not exist.
pub async fn find_report_definition(
    api: &dyn ReportDefinitionApi,
    report_name: &str,
) -> Result<Option<CurReportDefinition>, ApiError> {
    let mut next_token = None;
    loop {
        let page = api.describe_report_definitions(next_token).await?;
        if let Some(found) = page
            .definitions
            .into_iter()
            .find(|d| d.report_name == report_name)
        {
            return Ok(Some(found));
        }
        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => return Ok(None),
        }
    }
}

#[async_trait]
impl ReportDefinitionApi for aws_sdk_costandusagereport::Client {
    async fn describe_report_definitions(
        &self,
        next_token: Option<String>,
    ) -> Result<ReportDefinitionPage, ApiError> {
        let output = aws_sdk_costandusagereport::Client::describe_report_definitions(self)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::remote("DescribeReportDefinitions", e))?;

        Ok(ReportDefinitionPage {
            definitions: output
                .report_definitions()
                .iter()
                .map(CurReportDefinition::from)
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn put_report_definition(
        &self,
        definition: &CurReportDefinition,
    ) -> Result<(), ApiError> {
        tracing::debug!(report_name = %definition.report_name, "Creating report definition");
        aws_sdk_costandusagereport::Client::put_report_definition(self)
            .report_definition(definition.to_sdk()?)
            .send()
            .await
            .map_err(|e| ApiError::remote("PutReportDefinition", e))?;
        Ok(())
    }

    async fn modify_report_definition(
        &self,
        definition: &CurReportDefinition,
    ) -> Result<(), ApiError> {
        tracing::debug!(report_name = %definition.report_name, "Modifying report definition");
        aws_sdk_costandusagereport::Client::modify_report_definition(self)
            .report_name(&definition.report_name)
            .report_definition(definition.to_sdk()?)
            .send()
            .await
            .map_err(|e| ApiError::remote("ModifyReportDefinition", e))?;
        Ok(())
    }

    async fn delete_report_definition(&self, report_name: &str) -> Result<(), ApiError> {
        tracing::debug!(report_name, "Deleting report definition");
        aws_sdk_costandusagereport::Client::delete_report_definition(self)
            .report_name(report_name)
            .send()
            .await
            .map_err(|e| ApiError::remote("DeleteReportDefinition", e))?;
        Ok(())
    }
}
