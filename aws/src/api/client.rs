use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_route53resolver::config::Credentials;

use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use super::error::ApiError;

/// Cost and Usage Reports are only served from this region
pub const CUR_REGION: &str = "us-east-1";

/// Provider block settings, parsed by `ClientConfig::from_provider_config`
#[derive(Clone, Default, PartialEq)]
pub struct ClientConfig {
    pub region: String,
    pub profile: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "** redacted **"))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl ClientConfig {
    /// Reads the provider block. `region` falls back to `AWS_REGION`, then
    /// `AWS_DEFAULT_REGION`; everything else left unset is resolved by the
    /// SDK's default chains.
    pub fn from_provider_config(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diags = Vec::new();
        let mut read = |name: &str| match config.get_optional_string(&AttributePath::new(name)) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                diags.push(
                    Diagnostic::error(format!("Invalid {}", name), e.to_string())
                        .with_attribute(AttributePath::new(name)),
                );
                None
            }
        };

        let region = read("region")
            .or_else(|| std::env::var("AWS_REGION").ok())
            .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
            .filter(|r| !r.is_empty());
        let profile = read("profile");
        let access_key = read("access_key");
        let secret_key = read("secret_key");
        let endpoint_url = read("endpoint_url");

        match region {
            Some(region) if diags.is_empty() => Ok(Self {
                region,
                profile,
                access_key,
                secret_key,
                endpoint_url,
            }),
            Some(_) => Err(diags),
            None => {
                diags.push(Diagnostic::error(
                    "region is required (set in provider config or AWS_REGION env var)",
                    "",
                ));
                Err(diags)
            }
        }
    }
}

/// The SDK clients shared by every resource and data source
#[derive(Clone, Debug)]
pub struct Clients {
    pub route53resolver: aws_sdk_route53resolver::Client,
    pub costandusagereport: aws_sdk_costandusagereport::Client,
}

impl Clients {
    pub async fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        let sdk_config = load_sdk_config(config).await?;
        Ok(Self::from_sdk_config(&sdk_config))
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        let cur_config = aws_sdk_costandusagereport::config::Builder::from(sdk_config)
            .region(Region::from_static(CUR_REGION))
            .build();

        Self {
            route53resolver: aws_sdk_route53resolver::Client::new(sdk_config),
            costandusagereport: aws_sdk_costandusagereport::Client::from_conf(cur_config),
        }
    }
}

async fn load_sdk_config(config: &ClientConfig) -> Result<SdkConfig, ApiError> {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    match (&config.access_key, &config.secret_key) {
        (Some(access_key), Some(secret_key)) => {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "terraform-provider-aws",
            ));
        }
        (None, None) => {}
        _ => {
            return Err(ApiError::InvalidConfiguration(
                "access_key and secret_key must be set together".to_string(),
            ))
        }
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        tracing::debug!(endpoint_url, "Overriding AWS endpoint");
        loader = loader.endpoint_url(endpoint_url);
    }

    Ok(loader.load().await)
}
