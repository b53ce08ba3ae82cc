//! Route53 Resolver endpoint data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::validate_config;
use tfplug::TfplugError;
use tracing::Instrument;

use super::filters::{build_filters, filter_block, FilterSet};
use crate::api::{ApiError, ResolverApi};

pub const TYPE_NAME: &str = "aws_route53_resolver_endpoint";

/// What the configuration asks for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointLookup {
    pub id: Option<String>,
    pub filters: FilterSet,
}

impl EndpointLookup {
    pub fn from_config(config: &DynamicValue) -> Result<Self, Diagnostic> {
        let read = |name: &str| {
            config
                .get_optional_string(&AttributePath::new(name))
                .map(|id| id.filter(|id| !id.is_empty()))
                .map_err(|e| {
                    Diagnostic::error(format!("Invalid {}", name), e.to_string())
                        .with_attribute(AttributePath::new(name))
                })
        };
        let id = match read("id")? {
            Some(id) => Some(id),
            None => read("resolver_id")?,
        };

        Ok(Self {
            id,
            filters: FilterSet::from_config(config)?,
        })
    }
}

/// A single resolved endpoint with its IP addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverEndpointRecord {
    pub id: String,
    pub arn: String,
    pub host_vpc_id: String,
    pub name: String,
    pub security_group_ids: Vec<String>,
    pub ip_addresses: Vec<String>,
}

/// Lists endpoints matching the lookup's filters, requires exactly one,
/// then fetches that endpoint's IP addresses.
///
/// The IP lookup uses the id of the endpoint that matched. The configured
/// id is only a fallback for a response without an id; when both exist
/// and differ, the matched endpoint wins and a warning is logged.
pub async fn resolve_endpoint(
    api: &dyn ResolverApi,
    lookup: &EndpointLookup,
) -> Result<ResolverEndpointRecord, ApiError> {
    let endpoints = api
        .list_resolver_endpoints(build_filters(&lookup.filters))
        .await?;

    let endpoint = match endpoints.as_slice() {
        [] => {
            return Err(ApiError::NotFound(
                "no Route53 Resolver Endpoint matched".to_string(),
            ))
        }
        [endpoint] => endpoint,
        many => {
            return Err(ApiError::AmbiguousResult(format!(
                "{} Route53 Resolver Endpoints matched",
                many.len()
            )))
        }
    };

    let endpoint_id = match (endpoint.id(), lookup.id.as_deref()) {
        (Some(resolved), Some(configured)) if resolved != configured => {
            tracing::warn!(
                resolved,
                configured,
                "configured id differs from the matched endpoint, using the matched endpoint"
            );
            resolved
        }
        (Some(resolved), _) => resolved,
        (None, Some(configured)) => configured,
        (None, None) => {
            return Err(ApiError::MissingRequiredInput(
                "matched Route53 Resolver Endpoint has no id and none was configured".to_string(),
            ))
        }
    };

    let ip_addresses: Vec<String> = api
        .list_resolver_endpoint_ip_addresses(endpoint_id)
        .await?
        .iter()
        .filter_map(|address| address.ip().map(str::to_string))
        .collect();

    if ip_addresses.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no IP addresses for Route53 Resolver Endpoint {}",
            endpoint_id
        )));
    }

    Ok(ResolverEndpointRecord {
        id: endpoint_id.to_string(),
        arn: endpoint.arn().unwrap_or_default().to_string(),
        host_vpc_id: endpoint.host_vpc_id().unwrap_or_default().to_string(),
        name: endpoint.name().unwrap_or_default().to_string(),
        security_group_ids: endpoint.security_group_ids().to_vec(),
        ip_addresses,
    })
}

#[derive(Default)]
pub struct ResolverEndpointDataSource {
    provider_data: Option<crate::AwsProviderData>,
}

impl ResolverEndpointDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a single Route53 Resolver endpoint and its IP addresses")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The endpoint ID")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("resolver_id", AttributeType::String)
                    .description("Alias of id, used when id is not set")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("arn", AttributeType::String)
                    .description("The endpoint ARN")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("host_vpc_id", AttributeType::String)
                    .description("The VPC the endpoint's network interfaces live in")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The endpoint name")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ip_addresses", AttributeType::list_of_strings())
                    .description("IPv4 addresses of the endpoint")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("security_group_ids", AttributeType::list_of_strings())
                    .description("Security groups attached to the endpoint")
                    .computed()
                    .build(),
            )
            .block(filter_block())
            .build()
    }

    /// Configured values are echoed as written; merging repeated filter
    /// names only shapes the request. Computed values fill what the
    /// configuration left null.
    fn to_state(record: ResolverEndpointRecord, config: &DynamicValue) -> tfplug::Result<DynamicValue> {
        let configured = |name: &str| match config.get(&AttributePath::new(name)) {
            Ok(Dynamic::Null) | Err(_) => None,
            Ok(value) => Some(value.clone()),
        };

        let mut state = DynamicValue::null();
        for name in ["id", "resolver_id"] {
            let value = configured(name).unwrap_or_else(|| Dynamic::from(record.id.as_str()));
            state.set_value(&AttributePath::new(name), value)?;
        }
        state.set_string(&AttributePath::new("arn"), record.arn)?;
        state.set_string(&AttributePath::new("host_vpc_id"), record.host_vpc_id)?;
        state.set_string(&AttributePath::new("name"), record.name)?;
        state.set_string_list(&AttributePath::new("ip_addresses"), record.ip_addresses)?;
        state.set_string_list(
            &AttributePath::new("security_group_ids"),
            record.security_group_ids,
        )?;
        state.set_value(
            &AttributePath::new("filter"),
            configured("filter").unwrap_or(Dynamic::Null),
        )?;
        Ok(state)
    }
}

#[async_trait]
impl DataSource for ResolverEndpointDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(&self, _ctx: Context) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: validate_config(&Self::schema_static(), &request.config),
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let span = ctx.span("read", TYPE_NAME);

        let Some(provider_data) = &self.provider_data else {
            return ReadDataSourceResponse::failed(
                TfplugError::ProviderNotConfigured("read".to_string()).into(),
            );
        };

        let lookup = match EndpointLookup::from_config(&request.config) {
            Ok(lookup) => lookup,
            Err(diag) => return ReadDataSourceResponse::failed(diag),
        };

        tracing::debug!(parent: &span, ?lookup, "Reading Route53 Resolver Endpoint");
        let record = match resolve_endpoint(provider_data.resolver.as_ref(), &lookup)
            .instrument(span)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                return ReadDataSourceResponse::failed(Diagnostic::error(
                    "Error reading Route53 Resolver Endpoint",
                    e.to_string(),
                ))
            }
        };

        match Self::to_state(record, &request.config) {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => ReadDataSourceResponse::failed(Diagnostic::error(
                "Failed to set state",
                e.to_string(),
            )),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ResolverEndpointDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        match request.provider_data {
            Some(data) => match data.downcast_ref::<crate::AwsProviderData>() {
                Some(provider_data) => self.provider_data = Some(provider_data.clone()),
                None => {
                    tracing::error!("Failed to downcast provider data to AwsProviderData");
                    diagnostics.push(Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract AwsProviderData from provider data",
                    ));
                }
            },
            None => {
                tracing::warn!("No provider data provided to {}", TYPE_NAME);
                diagnostics.push(Diagnostic::error(
                    "No provider data",
                    "No provider data was provided to the data source",
                ));
            }
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
