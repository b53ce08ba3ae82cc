//! The resolver endpoint data source against a mock Route53 Resolver API

mod common;

use common::{configure_provider, operation, RESOLVER_TARGET_PREFIX};
use mockito::{Matcher, Server};
use serde_json::json;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, ReadDataSourceRequest};
use tfplug::provider::Provider;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tfplug::DataSourceWithConfigure;

const TYPE_NAME: &str = "aws_route53_resolver_endpoint";

async fn data_source(server: &mockito::ServerGuard) -> Box<dyn DataSourceWithConfigure> {
    let provider_data = configure_provider(server).await;

    let factories = aws::AwsProvider::new().data_sources();
    let mut data_source = factories.get(TYPE_NAME).unwrap()();
    let response = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    data_source
}

fn read_request(config: serde_json::Value) -> ReadDataSourceRequest {
    ReadDataSourceRequest {
        type_name: TYPE_NAME.to_string(),
        config: DynamicValue::new(Dynamic::from(config)),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn reads_endpoint_and_ip_addresses() {
    let mut server = Server::new_async().await;

    let list_mock = operation(&mut server, RESOLVER_TARGET_PREFIX, "ListResolverEndpoints")
        .match_body(Matcher::PartialJson(json!({
            "Filters": [{ "Name": "HostVPCId", "Values": ["vpc-1"] }]
        })))
        .with_body(
            json!({
                "ResolverEndpoints": [{
                    "Id": "rslvr-1",
                    "Arn": "arn:aws:route53resolver:us-east-1:123456789012:resolver-endpoint/rslvr-1",
                    "HostVPCId": "vpc-1",
                    "Name": "ep1",
                    "SecurityGroupIds": ["sg-1"],
                    "Direction": "INBOUND",
                    "IpAddressCount": 2,
                    "Status": "OPERATIONAL"
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let ip_mock = operation(
        &mut server,
        RESOLVER_TARGET_PREFIX,
        "ListResolverEndpointIpAddresses",
    )
    .match_body(Matcher::PartialJson(json!({ "ResolverEndpointId": "rslvr-1" })))
    .with_body(
        json!({
            "IpAddresses": [
                { "IpId": "rni-1", "SubnetId": "subnet-1", "Ip": "10.0.0.5" },
                { "IpId": "rni-2", "SubnetId": "subnet-2", "Ip": "10.0.0.6" }
            ]
        })
        .to_string(),
    )
    .expect(1)
    .create_async()
    .await;

    let data_source = data_source(&server).await;
    let response = data_source
        .read(
            Context::new(),
            read_request(json!({
                "filter": [{ "name": "HostVPCId", "values": ["vpc-1"] }]
            })),
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "rslvr-1");
    assert_eq!(
        state.get_string(&AttributePath::new("arn")).unwrap(),
        "arn:aws:route53resolver:us-east-1:123456789012:resolver-endpoint/rslvr-1"
    );
    assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "ep1");
    assert_eq!(
        state
            .get_string_list(&AttributePath::new("security_group_ids"))
            .unwrap(),
        vec!["sg-1"]
    );
    assert_eq!(
        state
            .get_string_list(&AttributePath::new("ip_addresses"))
            .unwrap(),
        vec!["10.0.0.5", "10.0.0.6"]
    );

    list_mock.assert_async().await;
    ip_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn multiple_matches_fail_without_ip_lookup() {
    let mut server = Server::new_async().await;

    let _list_mock = operation(&mut server, RESOLVER_TARGET_PREFIX, "ListResolverEndpoints")
        .with_body(
            json!({
                "ResolverEndpoints": [
                    { "Id": "rslvr-1", "Name": "ep1" },
                    { "Id": "rslvr-2", "Name": "ep2" }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let ip_mock = operation(
        &mut server,
        RESOLVER_TARGET_PREFIX,
        "ListResolverEndpointIpAddresses",
    )
    .expect(0)
    .create_async()
    .await;

    let data_source = data_source(&server).await;
    let response = data_source.read(Context::new(), read_request(json!({}))).await;

    assert!(response.state.is_null());
    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0]
        .detail
        .contains("multiple results found, try adjusting search criteria"));
    ip_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn no_match_is_reported_as_not_found() {
    let mut server = Server::new_async().await;

    let _list_mock = operation(&mut server, RESOLVER_TARGET_PREFIX, "ListResolverEndpoints")
        .with_body(json!({ "ResolverEndpoints": [] }).to_string())
        .create_async()
        .await;

    let data_source = data_source(&server).await;
    let response = data_source
        .read(Context::new(), read_request(json!({ "id": "rslvr-404" })))
        .await;

    assert!(response.state.is_null());
    assert!(response.diagnostics[0].detail.contains("no results found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn service_error_is_reported() {
    let mut server = Server::new_async().await;

    let _list_mock = server
        .mock("POST", "/")
        .with_status(400)
        .with_header("content-type", "application/x-amz-json-1.1")
        .with_body(
            json!({
                "__type": "InvalidParameterException",
                "message": "Unknown filter name: Color"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let data_source = data_source(&server).await;
    let response = data_source
        .read(
            Context::new(),
            read_request(json!({
                "filter": [{ "name": "Color", "values": ["blue"] }]
            })),
        )
        .await;

    assert!(response.state.is_null());
    assert!(response.diagnostics[0]
        .detail
        .contains("ListResolverEndpoints failed"));
}
