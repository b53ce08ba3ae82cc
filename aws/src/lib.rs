pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::AwsProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::Diagnostic;
use tfplug::{DataSourceWithConfigure, ResourceWithConfigure};
use tracing::Instrument;

pub struct AwsProvider {
    provider_data: Option<AwsProviderData>,
}

impl Default for AwsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    /// Clients built by the last successful `configure`
    pub fn provider_data(&self) -> Option<&AwsProviderData> {
        self.provider_data.as_ref()
    }
}

#[async_trait]
impl Provider for AwsProvider {
    fn type_name(&self) -> &str {
        "aws"
    }

    async fn schema(&self, _ctx: Context) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("AWS provider")
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .description("AWS region. Can also be set with AWS_REGION or AWS_DEFAULT_REGION")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("profile", AttributeType::String)
                    .description("Named profile from the shared config and credentials files")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("access_key", AttributeType::String)
                    .description("Static access key, set together with secret_key")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("secret_key", AttributeType::String)
                    .description("Static secret key, set together with access_key")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint_url", AttributeType::String)
                    .description("Overrides the endpoint of every service, e.g. for local testing")
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let span = ctx.span("configure", "aws");

        let config = match api::ClientConfig::from_provider_config(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        };

        tracing::info!(parent: &span, region = %config.region, terraform_version = %request.terraform_version, "Configuring AWS provider");
        match api::Clients::connect(&config).instrument(span).await {
            Ok(clients) => {
                let provider_data = AwsProviderData::new(clients);
                self.provider_data = Some(provider_data.clone());
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(provider_data)),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to create AWS clients",
                    e.to_string(),
                )],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            resources::cur_report_definition::TYPE_NAME.to_string(),
            Box::new(|| {
                Box::new(resources::CurReportDefinitionResource::new())
                    as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            data_sources::route53_resolver_endpoint::TYPE_NAME.to_string(),
            Box::new(|| {
                Box::new(data_sources::ResolverEndpointDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
