//! HTTP client for the pharmacy catalog API.
//!
//! Wraps `reqwest` with typed decoding of the branches, prices, competitor
//! price and task queue endpoints. Non-2xx responses surface as
//! [`ClientError::UnexpectedStatus`]; nothing is retried.

use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Url};
use rxprice_core::{ApiEndpoints, AppConfig, CompetitorPrice, Outlet, PriceSnapshot, PricingTask};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::normalize::{
    normalize_competitor_price, normalize_outlet, normalize_price_row, normalize_task,
};
use crate::types::{
    BranchRecord, CompetitorRecord, DeleteTaskItem, DeleteTasksRequest, PriceRecord,
    StatusResponse, TaskRecord,
};

/// Parsed endpoint URLs.
#[derive(Debug, Clone)]
struct Endpoints {
    branches: Url,
    prices: Url,
    competitor_prices: Url,
    tasks: Url,
    tasks_delete: Url,
}

impl Endpoints {
    fn parse(endpoints: &ApiEndpoints) -> Result<Self, ClientError> {
        Ok(Self {
            branches: parse_url(&endpoints.branches_url)?,
            prices: parse_url(&endpoints.prices_url)?,
            competitor_prices: parse_url(&endpoints.competitor_prices_url)?,
            tasks: parse_url(&endpoints.tasks_url)?,
            tasks_delete: parse_url(&endpoints.tasks_delete_url)?,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Client for the catalog API.
///
/// The branches and competitor price endpoints are public; prices and the
/// task queue require the Basic authorization token.
pub struct CatalogClient {
    client: Client,
    endpoints: Endpoints,
    auth: HeaderValue,
    max_concurrent: usize,
}

impl CatalogClient {
    /// Creates a client with the given timeout, `User-Agent` and fan-out limit
    /// for competitor price fetches.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidUrl`] if any endpoint is not an absolute URL.
    /// - [`ClientError::InvalidHeader`] if the authorization token is not a
    ///   valid header value.
    /// - [`ClientError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        endpoints: &ApiEndpoints,
        api_auth: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_concurrent: usize,
    ) -> Result<Self, ClientError> {
        let endpoints = Endpoints::parse(endpoints)?;

        let mut auth = HeaderValue::from_str(&format!("Basic {api_auth}"))
            .map_err(|e| ClientError::InvalidHeader(format!("Authorization: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoints,
            auth,
            max_concurrent: max_concurrent.max(1),
        })
    }

    /// Creates a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.endpoints,
            &config.api_auth,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_concurrent_fetches,
        )
    }

    /// Fetches every known outlet with its coordinates and owner.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a list of branches.
    /// - [`ClientError::Normalization`] if a branch has non-numeric fields.
    pub async fn fetch_outlets(&self) -> Result<Vec<Outlet>, ClientError> {
        let url = self.endpoints.branches.clone();
        let records: Vec<BranchRecord> =
            send_json(self.client.get(url.clone()), &url, "branches").await?;

        let outlets = records
            .into_iter()
            .map(normalize_outlet)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(outlets = outlets.len(), "fetched outlets");
        Ok(outlets)
    }

    /// Fetches the current catalog snapshot of one outlet.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a list of price rows.
    /// - [`ClientError::Normalization`] if a row has non-numeric prices.
    pub async fn fetch_outlet_prices(
        &self,
        enterprise_code: i64,
        outlet_id: &str,
    ) -> Result<Vec<PriceSnapshot>, ClientError> {
        let mut url = self.endpoints.prices.clone();
        url.query_pairs_mut()
            .append_pair("code", &enterprise_code.to_string())
            .append_pair("idBranch", outlet_id);

        let request = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.auth.clone());
        let context = format!("prices(idBranch={outlet_id})");
        let records: Vec<PriceRecord> = send_json(request, &url, &context).await?;

        let rows = records
            .into_iter()
            .map(normalize_price_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(outlet_id, rows = rows.len(), "fetched outlet prices");
        Ok(rows)
    }

    /// Fetches the published prices of one competitor outlet by serial number.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::fetch_outlet_prices`].
    pub async fn fetch_outlet_catalog(
        &self,
        outlet: &Outlet,
    ) -> Result<Vec<CompetitorPrice>, ClientError> {
        let mut url = self.endpoints.competitor_prices.clone();
        url.query_pairs_mut()
            .append_pair("sn", &outlet.serial_number.to_string());

        let context = format!("competitor prices(sn={})", outlet.serial_number);
        let records: Vec<CompetitorRecord> =
            send_json(self.client.get(url.clone()), &url, &context).await?;

        let mut offers = Vec::with_capacity(records.len());
        for record in records {
            if let Some(offer) = normalize_competitor_price(record, &outlet.id)? {
                offers.push(offer);
            }
        }
        Ok(offers)
    }

    /// Fetches the published prices of every given competitor outlet, at most
    /// `max_concurrent` at a time.
    ///
    /// # Errors
    ///
    /// Returns the first error from any outlet; no partial result is kept.
    pub async fn fetch_competitor_prices(
        &self,
        outlets: &[&Outlet],
    ) -> Result<Vec<CompetitorPrice>, ClientError> {
        let fetches: Vec<_> = outlets
            .iter()
            .map(|outlet| self.fetch_outlet_catalog(outlet))
            .collect();
        let per_outlet: Vec<Vec<CompetitorPrice>> = stream::iter(fetches)
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await?;

        let offers: Vec<CompetitorPrice> = per_outlet.into_iter().flatten().collect();
        tracing::debug!(
            competitors = outlets.len(),
            offers = offers.len(),
            "fetched competitor prices"
        );
        Ok(offers)
    }

    /// Fetches the repricing queue, oldest entry first. Entries without a
    /// timestamp sort first.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a list of tasks.
    pub async fn fetch_tasks(&self) -> Result<Vec<PricingTask>, ClientError> {
        let url = self.endpoints.tasks.clone();
        let request = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.auth.clone());
        let records: Vec<TaskRecord> = send_json(request, &url, "tasks").await?;

        let mut tasks: Vec<PricingTask> = records.into_iter().map(normalize_task).collect();
        tasks.sort_by_key(|t| t.queued_at);
        Ok(tasks)
    }

    /// Removes the given outlets from the repricing queue in one request.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the body reports `"Status": "Error"`.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a status object.
    pub async fn delete_tasks(&self, outlet_ids: &[String]) -> Result<(), ClientError> {
        if outlet_ids.is_empty() {
            return Ok(());
        }

        let body = DeleteTasksRequest {
            items: outlet_ids
                .iter()
                .map(|id| DeleteTaskItem { id_branch: id })
                .collect(),
        };
        let url = self.endpoints.tasks_delete.clone();
        let request = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, self.auth.clone())
            .json(&body);
        let status: StatusResponse = send_json(request, &url, "tasks delete").await?;

        if status
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("error"))
        {
            return Err(ClientError::Api(
                status
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(tasks = outlet_ids.len(), "deleted tasks");
        Ok(())
    }
}

/// Sends a request, asserts a 2xx status, and decodes the JSON body.
async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &Url,
    context: &str,
) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            url: redact(url),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// URL without its query string, for error messages.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
