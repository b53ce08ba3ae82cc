//! Data source implementations

pub mod filters;
pub mod route53_resolver_endpoint;

pub use route53_resolver_endpoint::ResolverEndpointDataSource;
