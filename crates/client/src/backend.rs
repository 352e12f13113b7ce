//! Registry HTTP client.
//!
//! [`RegistryBackend`] is the seam the coordinators fetch through;
//! [`HttpBackend`] implements it with [`reqwest`] and [`RegistryWriter`]
//! carries the create/update/delete calls used by the modal dialogs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use smp_core::case;
use smp_core::inspection::InspectionInput;
use smp_core::pagination::{LookupPage, PageResult};
use smp_core::query::InspectionQuery;
use smp_core::types::DbId;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{
    AuthorityList, AuthorityOption, DataEnvelope, Deleted, ErrorEnvelope, InspectionList,
    InspectionRecord, SmpOption,
};

/// Read side of the registry used by the search screen and the form.
#[async_trait]
pub trait RegistryBackend: Send + Sync + 'static {
    /// `GET /inspections` for one query.
    async fn search(&self, query: &InspectionQuery)
        -> Result<PageResult<InspectionRecord>, ClientError>;

    /// `GET /smp/list` for one lookup term.
    async fn lookup_smp(&self, term: &str, page: i64) -> Result<LookupPage<SmpOption>, ClientError>;

    /// `GET /authority`.
    async fn list_authorities(&self) -> Result<Vec<AuthorityOption>, ClientError>;
}

/// Write side used by the create/edit and delete dialogs.
#[async_trait]
pub trait RegistryWriter: Send + Sync {
    /// `POST /inspections`.
    async fn create_inspection(&self, input: &InspectionInput)
        -> Result<InspectionRecord, ClientError>;

    /// `PATCH /inspections/{id}` with only the fields present in `input`.
    async fn update_inspection(
        &self,
        id: DbId,
        input: &InspectionInput,
    ) -> Result<InspectionRecord, ClientError>;

    /// `DELETE /inspections/{id}`; returns the deleted id.
    async fn delete_inspection(&self, id: DbId) -> Result<DbId, ClientError>;
}

/// HTTP client for one registry server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.base_url.clone())
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    // ---- private helpers ----

    /// Map a non-2xx response to [`ClientError::Api`], reading the server's
    /// error envelope when there is one.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| serde_json::from_value::<ErrorEnvelope>(case::decode(v)).ok())
                .and_then(|envelope| envelope.message())
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Check status, then decode the wire body into `T` in internal key-space.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let value: serde_json::Value = response.json().await?;
        Ok(serde_json::from_value(case::decode(value))?)
    }
}

#[async_trait]
impl RegistryBackend for HttpBackend {
    async fn search(
        &self,
        query: &InspectionQuery,
    ) -> Result<PageResult<InspectionRecord>, ClientError> {
        let response = self
            .client
            .get(format!("{}/inspections", self.base_url))
            .query(&query.to_params())
            .send()
            .await?;

        let list: InspectionList = Self::parse_response(response).await?;
        Ok(PageResult {
            items: list.data,
            meta: list.pagination,
        })
    }

    async fn lookup_smp(&self, term: &str, page: i64) -> Result<LookupPage<SmpOption>, ClientError> {
        let response = self
            .client
            .get(format!("{}/smp/list", self.base_url))
            .query(&[("search", term.to_string()), ("page", page.to_string())])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn list_authorities(&self) -> Result<Vec<AuthorityOption>, ClientError> {
        let response = self
            .client
            .get(format!("{}/authority", self.base_url))
            .send()
            .await?;

        let list: AuthorityList = Self::parse_response(response).await?;
        Ok(list.list)
    }
}

#[async_trait]
impl RegistryWriter for HttpBackend {
    async fn create_inspection(
        &self,
        input: &InspectionInput,
    ) -> Result<InspectionRecord, ClientError> {
        let response = self
            .client
            .post(format!("{}/inspections", self.base_url))
            .json(&wire_body(input)?)
            .send()
            .await?;

        let envelope: DataEnvelope<InspectionRecord> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    async fn update_inspection(
        &self,
        id: DbId,
        input: &InspectionInput,
    ) -> Result<InspectionRecord, ClientError> {
        let response = self
            .client
            .patch(format!("{}/inspections/{}", self.base_url, id))
            .json(&wire_body(input)?)
            .send()
            .await?;

        let envelope: DataEnvelope<InspectionRecord> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    async fn delete_inspection(&self, id: DbId) -> Result<DbId, ClientError> {
        let response = self
            .client
            .delete(format!("{}/inspections/{}", self.base_url, id))
            .send()
            .await?;

        let deleted: Deleted = Self::parse_response(response).await?;
        Ok(deleted.deleted_id)
    }
}

/// Serialize a request body and rewrite its keys into wire form.
fn wire_body<T: Serialize>(body: &T) -> Result<serde_json::Value, ClientError> {
    Ok(case::encode(serde_json::to_value(body)?))
}
