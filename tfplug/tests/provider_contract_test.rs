//! A provider wired end to end through the traits: configure hands out
//! provider data, factories build configured resources, CRUD and import
//! run against a shared in-memory store.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceSchemaResponse, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::{
    import_state_passthrough_id, validate_config, AttributeBuilder, AttributePath, AttributeType,
    Diagnostic, Dynamic, DynamicValue, Resource, ResourceWithConfigure, ResourceWithImportState,
    SchemaBuilder,
};

type Store = Arc<Mutex<HashMap<String, String>>>;

#[derive(Default)]
struct KvProvider;

#[async_trait]
impl Provider for KvProvider {
    fn type_name(&self) -> &str {
        "kv"
    }

    async fn schema(&self, _ctx: Context) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: SchemaBuilder::new().build(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        _request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let store: Store = Arc::default();
        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(Arc::new(store)),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "kv_entry".to_string(),
            Box::new(|| Box::new(EntryResource::default()) as Box<dyn ResourceWithConfigure>),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        HashMap::new()
    }
}

#[derive(Default)]
struct EntryResource {
    store: Option<Store>,
}

impl EntryResource {
    fn store(&self) -> &Store {
        self.store.as_ref().unwrap()
    }

    fn write(&self, config: &DynamicValue) -> DynamicValue {
        let key = config.get_string(&AttributePath::new("key")).unwrap();
        let value = config.get_string(&AttributePath::new("value")).unwrap();
        self.store().lock().unwrap().insert(key.clone(), value.clone());

        let mut state = DynamicValue::null();
        state.set_string(&AttributePath::new("id"), key.as_str()).unwrap();
        state.set_string(&AttributePath::new("key"), key).unwrap();
        state.set_string(&AttributePath::new("value"), value).unwrap();
        state
    }
}

#[async_trait]
impl Resource for EntryResource {
    fn type_name(&self) -> &str {
        "kv_entry"
    }

    async fn schema(&self, _ctx: Context) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(AttributeBuilder::new("id", AttributeType::String).computed().build())
                .attribute(
                    AttributeBuilder::new("key", AttributeType::String)
                        .required()
                        .force_new()
                        .build(),
                )
                .attribute(AttributeBuilder::new("value", AttributeType::String).required().build())
                .build(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let schema = self.schema(ctx).await.schema;
        ValidateResourceConfigResponse {
            diagnostics: validate_config(&schema, &request.config),
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        CreateResourceResponse {
            new_state: self.write(&request.config),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let key = request
            .current_state
            .get_string(&AttributePath::new("key"))
            .unwrap();
        let new_state = self.store().lock().unwrap().get(&key).map(|value| {
            let mut state = DynamicValue::null();
            state.set_string(&AttributePath::new("id"), key.as_str()).unwrap();
            state.set_string(&AttributePath::new("key"), key.as_str()).unwrap();
            state.set_string(&AttributePath::new("value"), value.as_str()).unwrap();
            state
        });
        ReadResourceResponse {
            new_state,
            diagnostics: vec![],
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: self.write(&request.config),
            diagnostics: vec![],
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let key = request.prior_state.get_string(&AttributePath::new("key")).unwrap();
        self.store().lock().unwrap().remove(&key);
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for EntryResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        match request.provider_data.and_then(|d| d.downcast_ref::<Store>().cloned()) {
            Some(store) => {
                self.store = Some(store);
                ConfigureResourceResponse {
                    diagnostics: vec![],
                }
            }
            None => ConfigureResourceResponse {
                diagnostics: vec![Diagnostic::error("Invalid provider data", "expected a store")],
            },
        }
    }
}

#[async_trait]
impl ResourceWithImportState for EntryResource {
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id(&request, "key")
    }
}

fn entry(key: &str, value: &str) -> DynamicValue {
    DynamicValue::new(Dynamic::from(serde_json::json!({ "key": key, "value": value })))
}

async fn configured_entry(provider: &mut KvProvider) -> Box<dyn ResourceWithConfigure> {
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: DynamicValue::null(),
            },
        )
        .await;

    let mut resource = provider.resources()["kv_entry"]();
    let configured = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: response.provider_data,
            },
        )
        .await;
    assert!(configured.diagnostics.is_empty());
    resource
}

#[tokio::test]
async fn resource_lifecycle_through_factory() {
    let mut provider = KvProvider;
    let resource = configured_entry(&mut provider).await;

    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "kv_entry".to_string(),
                planned_state: entry("a", "1"),
                config: entry("a", "1"),
            },
        )
        .await;
    assert_eq!(created.new_state.get_string(&AttributePath::new("id")).unwrap(), "a");

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "kv_entry".to_string(),
                prior_state: created.new_state.clone(),
                planned_state: entry("a", "2"),
                config: entry("a", "2"),
            },
        )
        .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "kv_entry".to_string(),
                current_state: updated.new_state.clone(),
            },
        )
        .await;
    assert_eq!(read.new_state, Some(updated.new_state.clone()));

    resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "kv_entry".to_string(),
                prior_state: updated.new_state.clone(),
            },
        )
        .await;
    let gone = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "kv_entry".to_string(),
                current_state: updated.new_state,
            },
        )
        .await;
    assert!(gone.new_state.is_none());
}

#[tokio::test]
async fn import_then_read_recovers_state() {
    let mut provider = KvProvider;
    let resource = configured_entry(&mut provider).await;
    resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "kv_entry".to_string(),
                planned_state: entry("b", "x"),
                config: entry("b", "x"),
            },
        )
        .await;

    let entry_resource = EntryResource {
        store: None,
    };
    let imported = entry_resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "kv_entry".to_string(),
                id: "b".to_string(),
            },
        )
        .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "kv_entry".to_string(),
                current_state: imported.imported_resources[0].state.clone(),
            },
        )
        .await;
    let state = read.new_state.unwrap();
    assert_eq!(state.get_string(&AttributePath::new("value")).unwrap(), "x");
}

#[tokio::test]
async fn validation_uses_schema() {
    let resource = EntryResource::default();

    let response = resource
        .validate(
            Context::new(),
            ValidateResourceConfigRequest {
                type_name: "kv_entry".to_string(),
                config: DynamicValue::new(Dynamic::from(serde_json::json!({ "key": "a" }))),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].attribute,
        Some(AttributePath::new("value"))
    );
}

#[tokio::test]
async fn concurrent_creates_share_provider_data() {
    let mut provider = KvProvider;
    let resource: Arc<dyn ResourceWithConfigure> = Arc::from(configured_entry(&mut provider).await);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let resource = resource.clone();
            tokio::spawn(async move {
                let key = format!("k{}", i);
                resource
                    .create(
                        Context::new(),
                        CreateResourceRequest {
                            type_name: "kv_entry".to_string(),
                            planned_state: entry(&key, "v"),
                            config: entry(&key, "v"),
                        },
                    )
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().diagnostics.is_empty());
    }

    for i in 0..8 {
        let mut state = DynamicValue::null();
        state
            .set_string(&AttributePath::new("key"), format!("k{}", i))
            .unwrap();
        let read = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "kv_entry".to_string(),
                    current_state: state,
                },
            )
            .await;
        assert!(read.new_state.is_some());
    }
}
