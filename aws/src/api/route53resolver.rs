//! Route53 Resolver API calls used by the provider

use async_trait::async_trait;
use aws_sdk_route53resolver::types::{Filter, IpAddressResponse, ResolverEndpoint};

use super::error::ApiError;

/// The two read-only calls behind the resolver endpoint data source.
/// Implemented for the SDK client; tests substitute in-memory fakes.
#[async_trait]
pub trait ResolverApi: Send + Sync {
    /// One `ListResolverEndpoints` request. `filters` is omitted from the
    /// request when empty.
    async fn list_resolver_endpoints(
        &self,
        filters: Vec<Filter>,
    ) -> Result<Vec<ResolverEndpoint>, ApiError>;

    /// One `ListResolverEndpointIpAddresses` request, first page only
    async fn list_resolver_endpoint_ip_addresses(
        &self,
        resolver_endpoint_id: &str,
    ) -> Result<Vec<IpAddressResponse>, ApiError>;
}

#[async_trait]
impl ResolverApi for aws_sdk_route53resolver::Client {
    async fn list_resolver_endpoints(
        &self,
        filters: Vec<Filter>,
    ) -> Result<Vec<ResolverEndpoint>, ApiError> {
        tracing::debug!(filters = ?filters, "Reading Route53 Resolver Endpoints");

        let output = aws_sdk_route53resolver::Client::list_resolver_endpoints(self)
            .set_filters((!filters.is_empty()).then_some(filters))
            .send()
            .await
            .map_err(|e| ApiError::remote("ListResolverEndpoints", e))?;

        Ok(output.resolver_endpoints.unwrap_or_default())
    }

    async fn list_resolver_endpoint_ip_addresses(
        &self,
        resolver_endpoint_id: &str,
    ) -> Result<Vec<IpAddressResponse>, ApiError> {
        tracing::debug!(resolver_endpoint_id, "Reading IP addresses");

        let output = aws_sdk_route53resolver::Client::list_resolver_endpoint_ip_addresses(self)
            .resolver_endpoint_id(resolver_endpoint_id)
            .send()
            .await
            .map_err(|e| ApiError::remote("ListResolverEndpointIpAddresses", e))?;

        let ip_addresses = output.ip_addresses.unwrap_or_default();
        tracing::debug!(count = ip_addresses.len(), "IP address response");
        Ok(ip_addresses)
    }
}
