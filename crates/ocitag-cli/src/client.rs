use std::time::SystemTime;

use anyhow::Context;
use async_trait::async_trait;
use ocitag_core::{
    Compartment, CompartmentLister, DbSystem, DbSystemLister, DbSystemUpdater, TaggerError,
    UpdateRequest,
};
use reqwest::header::ACCEPT;
use reqwest::{Method, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::signer::RequestSigner;

const IDENTITY_API_VERSION: &str = "20160918";
const MYSQL_API_VERSION: &str = "20190415";
const OPC_NEXT_PAGE: &str = "opc-next-page";
const OPC_REQUEST_ID: &str = "opc-request-id";

/// Base URLs of the two services a run talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub identity: Url,
    pub mysql: Url,
}

impl ServiceEndpoints {
    pub fn for_region(region: &str) -> anyhow::Result<Self> {
        Ok(Self {
            identity: parse_endpoint(&format!("https://identity.{region}.oci.oraclecloud.com"))?,
            mysql: parse_endpoint(&format!("https://mysql.{region}.ocs.oraclecloud.com"))?,
        })
    }

    pub fn with_overrides(mut self, identity: Option<&str>, mysql: Option<&str>) -> anyhow::Result<Self> {
        if let Some(identity) = identity {
            self.identity = parse_endpoint(identity)?;
        }
        if let Some(mysql) = mysql {
            self.mysql = parse_endpoint(mysql)?;
        }
        Ok(self)
    }
}

fn parse_endpoint(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid endpoint URL: {raw}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("Endpoint URL cannot be used as a base: {raw}");
    }
    Ok(url)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Signed REST client for the Identity and MySQL services.
pub struct OciClient {
    http: reqwest::Client,
    signer: RequestSigner,
    endpoints: ServiceEndpoints,
}

impl OciClient {
    pub fn new(signer: RequestSigner, endpoints: ServiceEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            signer,
            endpoints,
        }
    }

    fn url(
        base: &Url,
        version: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, TaggerError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| TaggerError::configuration(format!("Endpoint cannot be a base: {base}")))?
            .pop_if_empty()
            .push(version)
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn execute(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Response, TaggerError> {
        let date = httpdate::fmt_http_date(SystemTime::now());
        let headers = self
            .signer
            .sign(&method, &url, body.as_deref(), &date)
            .map_err(|e| TaggerError::configuration(format!("{e:#}")))?;

        debug!(%method, %url, "OCI request");
        let mut request = self
            .http
            .request(method, url)
            .headers(headers)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TaggerError::transport(e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(service_error(response).await)
        }
    }

    /// GETs a list endpoint, following `opc-next-page` until the last page.
    async fn list_all<T: DeserializeOwned>(
        &self,
        base: &Url,
        version: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, TaggerError> {
        let mut items = Vec::new();
        let mut page: Option<String> = None;
        loop {
            let mut params = query.to_vec();
            if let Some(page) = page.as_deref() {
                params.push(("page", page));
            }
            let url = Self::url(base, version, segments, &params)?;
            let response = self.execute(Method::GET, url, None).await?;
            let next = header_value(&response, OPC_NEXT_PAGE).filter(|p| !p.is_empty());
            let mut batch: Vec<T> = read_json(response).await?;
            items.append(&mut batch);

            match next {
                Some(next) => page = Some(next),
                None => return Ok(items),
            }
        }
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TaggerError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| TaggerError::transport(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| TaggerError::invalid_response(e.to_string()))
}

async fn service_error(response: Response) -> TaggerError {
    let status = response.status();
    let request_id = header_value(&response, OPC_REQUEST_ID);
    let body = response.text().await.unwrap_or_default();

    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let code = if parsed.code.is_empty() {
        status.canonical_reason().unwrap_or("Unknown").to_string()
    } else {
        parsed.code
    };
    let message = if parsed.message.is_empty() {
        body
    } else {
        parsed.message
    };
    TaggerError::service(status.as_u16(), code, message).with_request_id(request_id)
}

#[async_trait]
impl CompartmentLister for OciClient {
    async fn list_compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>, TaggerError> {
        self.list_all(
            &self.endpoints.identity,
            IDENTITY_API_VERSION,
            &["compartments"],
            &[
                ("compartmentId", tenancy_id),
                ("compartmentIdInSubtree", "true"),
                ("accessLevel", "ANY"),
            ],
        )
        .await
    }

    async fn get_compartment(&self, compartment_id: &str) -> Result<Compartment, TaggerError> {
        let url = Self::url(
            &self.endpoints.identity,
            IDENTITY_API_VERSION,
            &["compartments", compartment_id],
            &[],
        )?;
        let response = self.execute(Method::GET, url, None).await?;
        read_json(response).await
    }
}

#[async_trait]
impl DbSystemLister for OciClient {
    async fn list_db_systems(&self, compartment_id: &str) -> Result<Vec<DbSystem>, TaggerError> {
        self.list_all(
            &self.endpoints.mysql,
            MYSQL_API_VERSION,
            &["dbSystems"],
            &[("compartmentId", compartment_id)],
        )
        .await
    }
}

#[async_trait]
impl DbSystemUpdater for OciClient {
    async fn update_defined_tags(&self, request: &UpdateRequest) -> Result<(), TaggerError> {
        let url = Self::url(
            &self.endpoints.mysql,
            MYSQL_API_VERSION,
            &["dbSystems", request.db_system_id.as_str()],
            &[],
        )?;
        let body = serde_json::to_vec(&json!({ "definedTags": request.defined_tags }))?;
        self.execute(Method::PUT, url, Some(body)).await?;
        Ok(())
    }
}
