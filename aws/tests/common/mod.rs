//! Shared setup: a provider pointed at a mockito server speaking AWS JSON 1.1
#![allow(dead_code)]

use aws::AwsProvider;
use mockito::{Matcher, Mock, ServerGuard};
use std::any::Any;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::types::{AttributePath, DynamicValue};

pub const RESOLVER_TARGET_PREFIX: &str = "Route53Resolver";
pub const CUR_TARGET_PREFIX: &str = "AWSOrigamiServiceGatewayService";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Configures a provider against `server` and returns its provider data
pub async fn configure_provider(server: &ServerGuard) -> Arc<dyn Any + Send + Sync> {
    init_tracing();

    let mut config = DynamicValue::null();
    let _ = config.set_string(&AttributePath::new("region"), "us-east-1");
    let _ = config.set_string(&AttributePath::new("access_key"), "AKIDEXAMPLE");
    let _ = config.set_string(&AttributePath::new("secret_key"), "secret");
    let _ = config.set_string(&AttributePath::new("endpoint_url"), server.url());

    let mut provider = AwsProvider::new();
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    response.provider_data.expect("provider data")
}

/// A JSON 1.1 operation mock: POST / with the operation in X-Amz-Target
pub fn operation(server: &mut ServerGuard, target_prefix: &str, operation: &str) -> Mock {
    server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            Matcher::Exact(format!("{}.{}", target_prefix, operation)),
        )
        .with_status(200)
        .with_header("content-type", "application/x-amz-json-1.1")
}
