//! OpenFGA HTTP client.
//!
//! Talks to the OpenFGA REST API directly. On connect the client resolves the
//! store (by id, by name, or by creating it) and the authorization model (by
//! id, the latest one, or by uploading the configured model file).

use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    authorization::Authorization,
    config::AuthzConfig,
    error::{AuthzError, Result},
    models::{AccessibleResource, ObjectRef, RelationInput, TupleKey},
};

/// OpenFGA-backed [`Authorization`] store.
pub struct OpenFgaAuthz {
    client: reqwest::Client,
    api_url: String,
    store_id: String,
    model_id: String,
    page_size: u32,
    max_tuples_per_write: usize,
}

#[derive(Debug, Deserialize)]
struct Store {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListStoresResponse {
    #[serde(default)]
    stores: Vec<Store>,
    #[serde(default)]
    continuation_token: String,
}

#[derive(Debug, Deserialize)]
struct AuthorizationModel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    authorization_models: Vec<AuthorizationModel>,
}

#[derive(Debug, Deserialize)]
struct WriteModelResponse {
    authorization_model_id: String,
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    tuple_key: TupleKey,
    authorization_model_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    allowed: bool,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    writes: Option<TupleWrites>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deletes: Option<TupleDeletes>,
    authorization_model_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TupleWrites {
    tuple_keys: Vec<TupleKey>,
    on_duplicate: &'static str,
}

#[derive(Debug, Serialize)]
struct TupleDeletes {
    tuple_keys: Vec<TupleKey>,
    on_missing: &'static str,
}

/// Partial key accepted by the read endpoint.
#[derive(Debug, Default, Serialize)]
struct ReadTupleKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    relation: Option<String>,
    object: String,
}

#[derive(Debug, Serialize)]
struct ReadRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    tuple_key: Option<ReadTupleKey>,
    page_size: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    continuation_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct StoredTuple {
    key: TupleKey,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    #[serde(default)]
    tuples: Vec<StoredTuple>,
    #[serde(default)]
    continuation_token: String,
}

#[derive(Debug, Serialize)]
struct ListObjectsRequest<'a> {
    authorization_model_id: &'a str,
    #[serde(rename = "type")]
    object_type: &'a str,
    relation: &'a str,
    user: String,
}

#[derive(Debug, Deserialize)]
struct ListObjectsResponse {
    #[serde(default)]
    objects: Vec<String>,
}

impl OpenFgaAuthz {
    /// Connect to the configured endpoint and resolve the store and model.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint is unreachable, rejects a bootstrap call, or
    /// the model file is needed but cannot be read.
    pub async fn connect(config: &AuthzConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                AuthzError::Configuration("API token is not a valid header value".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        let mut authz = Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            store_id: String::new(),
            model_id: String::new(),
            page_size: config.page_size.max(1),
            max_tuples_per_write: config.max_tuples_per_write.max(1),
        };

        authz.store_id = match &config.store_id {
            Some(id) => id.clone(),
            None => authz.find_or_create_store(&config.store_name).await?,
        };
        authz.model_id = match &config.model_id {
            Some(id) => id.clone(),
            None => authz.latest_or_upload_model(&config.model_file_path).await?,
        };

        info!(
            store_id = %authz.store_id,
            model_id = %authz.model_id,
            "connected to OpenFGA"
        );
        Ok(authz)
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn store_url(&self, path: &str) -> String {
        self.url(&format!("stores/{}/{}", self.store_id, path))
    }

    async fn send<R: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<R> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthzError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<R>().await?)
    }

    async fn post<B, R>(&self, url: String, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(self.client.post(url).json(body)).await
    }

    async fn find_or_create_store(&self, name: &str) -> Result<String> {
        let mut token = String::new();
        loop {
            let mut request = self
                .client
                .get(self.url("stores"))
                .query(&[("page_size", self.page_size.to_string())]);
            if !token.is_empty() {
                request = request.query(&[("continuation_token", token.as_str())]);
            }
            let page: ListStoresResponse = self.send(request).await?;

            if let Some(store) = page.stores.into_iter().find(|s| s.name == name) {
                debug!(store_id = %store.id, store_name = %name, "found existing store");
                return Ok(store.id);
            }
            if page.continuation_token.is_empty() {
                break;
            }
            token = page.continuation_token;
        }

        let store: Store = self
            .post(self.url("stores"), &serde_json::json!({ "name": name }))
            .await?;
        info!(store_id = %store.id, store_name = %store.name, "created store");
        Ok(store.id)
    }

    async fn latest_or_upload_model(&self, model_file_path: &str) -> Result<String> {
        let request = self
            .client
            .get(self.store_url("authorization-models"))
            .query(&[("page_size", "1")]);
        let models: ListModelsResponse = self.send(request).await?;
        if let Some(model) = models.authorization_models.into_iter().next() {
            debug!(model_id = %model.id, "using latest authorization model");
            return Ok(model.id);
        }

        let source = tokio::fs::read_to_string(model_file_path)
            .await
            .map_err(|e| AuthzError::ModelSource(format!("{model_file_path}: {e}")))?;
        let model: serde_json::Value = serde_json::from_str(&source)
            .map_err(|e| AuthzError::ModelSource(format!("{model_file_path}: {e}")))?;

        let written: WriteModelResponse =
            self.post(self.store_url("authorization-models"), &model).await?;
        info!(
            model_id = %written.authorization_model_id,
            path = %model_file_path,
            "uploaded authorization model"
        );
        Ok(written.authorization_model_id)
    }

    async fn write_tuples(&self, writes: Vec<TupleKey>, deletes: Vec<TupleKey>) -> Result<()> {
        let request = WriteRequest {
            writes: (!writes.is_empty()).then(|| TupleWrites {
                tuple_keys: writes,
                on_duplicate: "ignore",
            }),
            deletes: (!deletes.is_empty()).then(|| TupleDeletes {
                tuple_keys: deletes,
                on_missing: "ignore",
            }),
            authorization_model_id: &self.model_id,
        };
        let _: serde_json::Value = self.post(self.store_url("write"), &request).await?;
        Ok(())
    }

    async fn delete_chunked(&self, tuples: Vec<TupleKey>) -> Result<()> {
        let total = tuples.len();
        for chunk in tuples.chunks(self.max_tuples_per_write) {
            self.write_tuples(Vec::new(), chunk.to_vec()).await?;
        }
        debug!(deleted = total, "deleted tuples");
        Ok(())
    }

    /// Narrow a filter to what the read endpoint accepts. Only the object and
    /// relation are pushed down: the endpoint compares users literally, so a
    /// pushed user would hide userset subjects such as `support_group:3#member`
    /// that `matches` accepts. Without an object id the store is scanned.
    fn read_key(filter: &RelationInput) -> Option<ReadTupleKey> {
        if filter.object_type.is_empty() || filter.object_id.is_empty() {
            return None;
        }
        Some(ReadTupleKey {
            relation: (!filter.relation.is_empty()).then(|| filter.relation.clone()),
            object: format!("{}:{}", filter.object_type, filter.object_id),
        })
    }

    async fn read_matching(&self, filter: &RelationInput) -> Result<Vec<RelationInput>> {
        let mut matched = Vec::new();
        let mut token = String::new();
        loop {
            let request = ReadRequest {
                tuple_key: Self::read_key(filter),
                page_size: self.page_size,
                continuation_token: &token,
            };
            let page: ReadResponse = self.post(self.store_url("read"), &request).await?;

            for stored in page.tuples {
                match stored.key.to_relation_input() {
                    Some(tuple) if filter.matches(&tuple) => matched.push(tuple),
                    Some(_) => {}
                    None => warn!(
                        user = %stored.key.user,
                        object = %stored.key.object,
                        "skipping malformed tuple"
                    ),
                }
            }

            if page.continuation_token.is_empty() {
                break;
            }
            token = page.continuation_token;
        }
        Ok(matched)
    }
}

fn require_complete(r: &RelationInput) -> Result<()> {
    if r.is_complete() {
        Ok(())
    } else {
        Err(AuthzError::IncompleteTuple(r.to_string()))
    }
}

#[async_trait]
impl Authorization for OpenFgaAuthz {
    async fn check_permission(&self, r: &RelationInput) -> Result<bool> {
        require_complete(r)?;
        let request = CheckRequest {
            tuple_key: r.to_tuple_key(),
            authorization_model_id: &self.model_id,
        };
        let response: CheckResponse = self.post(self.store_url("check"), &request).await?;
        debug!(tuple = %r, allowed = response.allowed, "checked permission");
        Ok(response.allowed)
    }

    async fn add_relation(&self, r: &RelationInput) -> Result<()> {
        require_complete(r)?;
        self.write_tuples(vec![r.to_tuple_key()], Vec::new()).await
    }

    async fn add_relation_bulk(&self, relations: &[RelationInput]) -> Result<()> {
        for r in relations {
            require_complete(r)?;
        }
        for chunk in relations.chunks(self.max_tuples_per_write) {
            let keys = chunk.iter().map(RelationInput::to_tuple_key).collect();
            self.write_tuples(keys, Vec::new()).await?;
        }
        Ok(())
    }

    async fn remove_relation(&self, r: &RelationInput) -> Result<()> {
        if r.is_complete() {
            return self.write_tuples(Vec::new(), vec![r.to_tuple_key()]).await;
        }
        self.remove_relation_bulk(std::slice::from_ref(r)).await
    }

    async fn remove_relation_bulk(&self, filters: &[RelationInput]) -> Result<()> {
        let mut doomed = BTreeSet::new();
        for filter in filters {
            if *filter == RelationInput::filter() {
                return Err(AuthzError::InvalidFilter(
                    "an empty filter matches every tuple; use remove_all_relations".to_string(),
                ));
            }
            doomed.extend(self.read_matching(filter).await?);
        }
        self.delete_chunked(doomed.iter().map(RelationInput::to_tuple_key).collect())
            .await
    }

    async fn remove_all_relations(&self) -> Result<()> {
        let all = self.read_matching(&RelationInput::filter()).await?;
        self.delete_chunked(all.iter().map(RelationInput::to_tuple_key).collect())
            .await
    }

    async fn list_relations(&self, filter: &RelationInput) -> Result<Vec<RelationInput>> {
        self.read_matching(filter).await
    }

    async fn list_accessible_resources(
        &self,
        r: &RelationInput,
    ) -> Result<Vec<AccessibleResource>> {
        if r.user_type.is_empty()
            || r.user_id.is_empty()
            || r.relation.is_empty()
            || r.object_type.is_empty()
        {
            return Err(AuthzError::InvalidFilter(format!(
                "listing resources needs a user, relation and object type: {r}"
            )));
        }
        let request = ListObjectsRequest {
            authorization_model_id: &self.model_id,
            object_type: &r.object_type,
            relation: &r.relation,
            user: format!("{}:{}", r.user_type, r.user_id),
        };
        let response: ListObjectsResponse =
            self.post(self.store_url("list-objects"), &request).await?;

        Ok(response
            .objects
            .iter()
            .filter_map(|object| ObjectRef::parse(object))
            .map(|object| AccessibleResource {
                object_type: object.kind,
                object_id: object.id,
            })
            .collect())
    }
}
