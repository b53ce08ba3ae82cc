//! Cost and Usage Report definition resource

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::TfplugError;
use tfplug::validator::{
    validate_config, StringLengthValidator, StringOneOfValidator, StringPatternValidator,
};
use tracing::Instrument;

use crate::api::cur::DEFAULT_REPORT_VERSIONING;
use crate::api::{find_report_definition, CurReportDefinition};

pub const TYPE_NAME: &str = "aws_cur_report_definition";

const REPORT_NAME_PATTERN: &str = r"^[0-9A-Za-z!\-_.*'()]+$";

const TIME_UNITS: &[&str] = &["HOURLY", "DAILY", "MONTHLY"];
const FORMATS: &[&str] = &["textORcsv", "Parquet"];
const COMPRESSIONS: &[&str] = &["ZIP", "GZIP", "Parquet"];
const SCHEMA_ELEMENTS: &[&str] = &["RESOURCES", "SPLIT_COST_ALLOCATION_DATA"];
const ARTIFACTS: &[&str] = &["REDSHIFT", "QUICKSIGHT", "ATHENA"];
const VERSIONINGS: &[&str] = &["CREATE_NEW_REPORT", "OVERWRITE_REPORT"];

#[derive(Default)]
pub struct CurReportDefinitionResource {
    provider_data: Option<crate::AwsProviderData>,
}

impl CurReportDefinitionResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> tfplug::Result<Schema> {
        Ok(SchemaBuilder::new()
            .version(0)
            .description("Manages a Cost and Usage Report definition")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Same as report_name")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("report_name", AttributeType::String)
                    .description("Unique name of the report")
                    .required()
                    .force_new()
                    .validator(StringLengthValidator {
                        min: Some(1),
                        max: Some(256),
                    })
                    .validator(StringPatternValidator::new(
                        REPORT_NAME_PATTERN,
                        "letters, digits and !-_.*'()",
                    )?)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("time_unit", AttributeType::String)
                    .description("Granularity of the line items: HOURLY, DAILY or MONTHLY")
                    .required()
                    .validator(StringOneOfValidator::new(TIME_UNITS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("format", AttributeType::String)
                    .description("textORcsv or Parquet")
                    .required()
                    .validator(StringOneOfValidator::new(FORMATS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("compression", AttributeType::String)
                    .description("ZIP, GZIP or Parquet")
                    .required()
                    .validator(StringOneOfValidator::new(COMPRESSIONS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("additional_schema_elements", AttributeType::set_of_strings())
                    .description("Extra report content, e.g. RESOURCES")
                    .required()
                    .validator(StringOneOfValidator::new(SCHEMA_ELEMENTS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("s3_bucket", AttributeType::String)
                    .description("Bucket the reports are delivered to")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("s3_prefix", AttributeType::String)
                    .description("Key prefix for delivered reports")
                    .optional()
                    .computed()
                    .validator(StringLengthValidator {
                        min: None,
                        max: Some(256),
                    })
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("s3_region", AttributeType::String)
                    .description("Region of the bucket")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("additional_artifacts", AttributeType::set_of_strings())
                    .description("Integrations to generate artifacts for: REDSHIFT, QUICKSIGHT, ATHENA")
                    .optional()
                    .validator(StringOneOfValidator::new(ARTIFACTS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("refresh_closed_reports", AttributeType::Bool)
                    .description("Update closed reports when refunds, credits or support fees are applied. Defaults to true")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("report_versioning", AttributeType::String)
                    .description("CREATE_NEW_REPORT or OVERWRITE_REPORT. Defaults to CREATE_NEW_REPORT")
                    .optional()
                    .computed()
                    .validator(StringOneOfValidator::new(VERSIONINGS))
                    .build(),
            )
            .build())
    }

    /// Builds a definition from configuration, applying defaults for the
    /// optional attributes
    fn extract_definition(config: &DynamicValue) -> Result<CurReportDefinition, Diagnostic> {
        let required = |name: &str| {
            config.get_string(&AttributePath::new(name)).map_err(|e| {
                Diagnostic::error(format!("Missing {}", name), e.to_string())
                    .with_attribute(AttributePath::new(name))
            })
        };
        let invalid = |name: &str, e: tfplug::TfplugError| {
            Diagnostic::error(format!("Invalid {}", name), e.to_string())
                .with_attribute(AttributePath::new(name))
        };

        let additional_schema_elements = config
            .get_string_list(&AttributePath::new("additional_schema_elements"))
            .map_err(|e| invalid("additional_schema_elements", e))?;
        let additional_artifacts = config
            .get_optional_string_list(&AttributePath::new("additional_artifacts"))
            .map_err(|e| invalid("additional_artifacts", e))?
            .unwrap_or_default();
        let s3_prefix = config
            .get_optional_string(&AttributePath::new("s3_prefix"))
            .map_err(|e| invalid("s3_prefix", e))?
            .unwrap_or_default();
        let refresh_closed_reports = config
            .get_optional_bool(&AttributePath::new("refresh_closed_reports"))
            .map_err(|e| invalid("refresh_closed_reports", e))?
            .unwrap_or(true);
        let report_versioning = config
            .get_optional_string(&AttributePath::new("report_versioning"))
            .map_err(|e| invalid("report_versioning", e))?
            .unwrap_or_else(|| DEFAULT_REPORT_VERSIONING.to_string());

        Ok(CurReportDefinition {
            report_name: required("report_name")?,
            time_unit: required("time_unit")?,
            format: required("format")?,
            compression: required("compression")?,
            additional_schema_elements,
            s3_bucket: required("s3_bucket")?,
            s3_prefix,
            s3_region: required("s3_region")?,
            additional_artifacts,
            refresh_closed_reports,
            report_versioning,
        })
    }

    /// `previous` is the configuration being applied, or the prior state on
    /// read. An empty artifact list stays null when `previous` left it null.
    fn to_state(
        definition: &CurReportDefinition,
        previous: &DynamicValue,
    ) -> tfplug::Result<DynamicValue> {
        let mut state = DynamicValue::null();
        state.set_string(&AttributePath::new("id"), definition.report_name.as_str())?;
        state.set_string(&AttributePath::new("report_name"), definition.report_name.as_str())?;
        state.set_string(&AttributePath::new("time_unit"), definition.time_unit.as_str())?;
        state.set_string(&AttributePath::new("format"), definition.format.as_str())?;
        state.set_string(&AttributePath::new("compression"), definition.compression.as_str())?;
        state.set_string_list(
            &AttributePath::new("additional_schema_elements"),
            definition.additional_schema_elements.clone(),
        )?;
        state.set_string(&AttributePath::new("s3_bucket"), definition.s3_bucket.as_str())?;
        state.set_string(&AttributePath::new("s3_prefix"), definition.s3_prefix.as_str())?;
        state.set_string(&AttributePath::new("s3_region"), definition.s3_region.as_str())?;
        let artifacts_path = AttributePath::new("additional_artifacts");
        let artifacts_unset = matches!(
            previous.get_optional_string_list(&artifacts_path),
            Ok(None)
        );
        if definition.additional_artifacts.is_empty() && artifacts_unset {
            state.set_null(&artifacts_path)?;
        } else {
            state.set_string_list(&artifacts_path, definition.additional_artifacts.clone())?;
        }
        state.set_bool(
            &AttributePath::new("refresh_closed_reports"),
            definition.refresh_closed_reports,
        )?;
        state.set_string(
            &AttributePath::new("report_versioning"),
            definition.report_versioning.as_str(),
        )?;
        Ok(state)
    }

    /// Report name from state; imported state only carries `id`
    fn report_name(state: &DynamicValue) -> Option<String> {
        ["report_name", "id"]
            .iter()
            .find_map(|name| state.get_optional_string(&AttributePath::new(name)).ok().flatten())
            .filter(|name| !name.is_empty())
    }
}

/// Rules spanning several attributes that the service enforces on put
pub fn check_report_combination(definition: &CurReportDefinition) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];
    let artifacts = &definition.additional_artifacts;
    let has = |artifact: &str| artifacts.iter().any(|a| a == artifact);
    let artifacts_path = AttributePath::new("additional_artifacts");

    if has("ATHENA") {
        if artifacts.iter().any(|a| a != "ATHENA") {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid additional_artifacts",
                    "When ATHENA is in additional_artifacts, no other artifact type can be declared",
                )
                .with_attribute(artifacts_path.clone()),
            );
        }
        if definition.format != "Parquet" {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid format",
                    "When ATHENA is in additional_artifacts, format must be Parquet",
                )
                .with_attribute(AttributePath::new("format")),
            );
        }
        if definition.report_versioning != "OVERWRITE_REPORT" {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid report_versioning",
                    "When ATHENA is in additional_artifacts, report_versioning must be OVERWRITE_REPORT",
                )
                .with_attribute(AttributePath::new("report_versioning")),
            );
        }
    }

    if (has("REDSHIFT") || has("QUICKSIGHT")) && definition.format != "textORcsv" {
        diagnostics.push(
            Diagnostic::error(
                "Invalid format",
                "When REDSHIFT or QUICKSIGHT is in additional_artifacts, format must be textORcsv",
            )
            .with_attribute(AttributePath::new("format")),
        );
    }

    match definition.format.as_str() {
        "Parquet" if definition.compression != "Parquet" => diagnostics.push(
            Diagnostic::error(
                "Invalid compression",
                "When format is Parquet, compression must also be Parquet",
            )
            .with_attribute(AttributePath::new("compression")),
        ),
        "textORcsv" if !matches!(definition.compression.as_str(), "ZIP" | "GZIP") => diagnostics
            .push(
                Diagnostic::error(
                    "Invalid compression",
                    "When format is textORcsv, compression must be ZIP or GZIP",
                )
                .with_attribute(AttributePath::new("compression")),
            ),
        _ => {}
    }

    diagnostics
}

fn state_error(e: tfplug::TfplugError) -> Diagnostic {
    Diagnostic::error("Failed to set state", e.to_string())
}

#[async_trait]
impl Resource for CurReportDefinitionResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(&self, _ctx: Context) -> ResourceSchemaResponse {
        match Self::schema_static() {
            Ok(schema) => ResourceSchemaResponse {
                schema,
                diagnostics: vec![],
            },
            Err(e) => ResourceSchemaResponse {
                schema: SchemaBuilder::new().build(),
                diagnostics: vec![Diagnostic::error("Invalid schema", e.to_string())],
            },
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let schema = match Self::schema_static() {
            Ok(schema) => schema,
            Err(e) => {
                return ValidateResourceConfigResponse {
                    diagnostics: vec![Diagnostic::error("Invalid schema", e.to_string())],
                }
            }
        };

        let mut diagnostics = validate_config(&schema, &request.config);
        // Combinations can only be checked once every value involved is known
        if let Ok(definition) = Self::extract_definition(&request.config) {
            diagnostics.extend(check_report_combination(&definition));
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let span = ctx.span("create", TYPE_NAME);
        let failed = |diagnostic: Diagnostic, planned_state: DynamicValue| CreateResourceResponse {
            new_state: planned_state,
            diagnostics: vec![diagnostic],
        };

        let Some(provider_data) = &self.provider_data else {
            return failed(
                TfplugError::ProviderNotConfigured("create".to_string()).into(),
                request.planned_state,
            );
        };

        let definition = match Self::extract_definition(&request.config) {
            Ok(definition) => definition,
            Err(diag) => return failed(diag, request.planned_state),
        };

        if let Err(e) = provider_data
            .reports
            .put_report_definition(&definition)
            .instrument(span)
            .await
        {
            return failed(
                Diagnostic::error("Error creating Cost and Usage Report definition", e.to_string()),
                request.planned_state,
            );
        }

        match Self::to_state(&definition, &request.config) {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => failed(state_error(e), request.planned_state),
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let span = ctx.span("read", TYPE_NAME);

        let Some(report_name) = Self::report_name(&request.current_state) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            };
        };

        let Some(provider_data) = &self.provider_data else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![TfplugError::ProviderNotConfigured("read".to_string()).into()],
            };
        };

        match find_report_definition(provider_data.reports.as_ref(), &report_name)
            .instrument(span.clone())
            .await
        {
            Ok(Some(definition)) => match Self::to_state(&definition, &request.current_state) {
                Ok(state) => ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics: vec![],
                },
                Err(e) => ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![state_error(e)],
                },
            },
            Ok(None) => {
                tracing::warn!(parent: &span, %report_name, "Report definition not found, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Error reading Cost and Usage Report definition",
                    e.to_string(),
                )],
            },
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let span = ctx.span("update", TYPE_NAME);
        let failed = |diagnostic: Diagnostic, prior_state: DynamicValue| UpdateResourceResponse {
            new_state: prior_state,
            diagnostics: vec![diagnostic],
        };

        let Some(provider_data) = &self.provider_data else {
            return failed(
                TfplugError::ProviderNotConfigured("update".to_string()).into(),
                request.prior_state,
            );
        };

        let definition = match Self::extract_definition(&request.config) {
            Ok(definition) => definition,
            Err(diag) => return failed(diag, request.prior_state),
        };

        if let Err(e) = provider_data
            .reports
            .modify_report_definition(&definition)
            .instrument(span)
            .await
        {
            return failed(
                Diagnostic::error("Error updating Cost and Usage Report definition", e.to_string()),
                request.prior_state,
            );
        }

        match Self::to_state(&definition, &request.config) {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => failed(state_error(e), request.prior_state),
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let span = ctx.span("delete", TYPE_NAME);

        let Some(provider_data) = &self.provider_data else {
            return DeleteResourceResponse {
                diagnostics: vec![TfplugError::ProviderNotConfigured("delete".to_string()).into()],
            };
        };

        // Nothing to delete without a name
        let Some(report_name) = Self::report_name(&request.prior_state) else {
            return DeleteResourceResponse {
                diagnostics: vec![],
            };
        };

        match provider_data
            .reports
            .delete_report_definition(&report_name)
            .instrument(span)
            .await
        {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![Diagnostic::error(
                    "Error deleting Cost and Usage Report definition",
                    e.to_string(),
                )],
            },
        }
    }
}

#[async_trait]
impl ResourceWithImportState for CurReportDefinitionResource {
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id(&request, "report_name")
    }
}

#[async_trait]
impl ResourceWithConfigure for CurReportDefinitionResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<crate::AwsProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract AwsProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}
