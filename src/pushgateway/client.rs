//! HTTP client for the Pushgateway API.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use url::Url;

use crate::liveness::GroupKey;
use crate::pushgateway::error::{PushgatewayError, PushgatewayResult};
use crate::pushgateway::model::{parse_query_response, MetricsGroup};
use crate::pushgateway::{GroupSink, SnapshotSource};

/// Reads and updates Pushgateway metrics.
#[derive(Debug, Clone)]
pub struct PushgatewayClient {
    base_url: Url,
    primary_label: String,
    http: reqwest::Client,
}

impl PushgatewayClient {
    /// Create a client for the gateway at `base_url`.
    ///
    /// `primary_label` is the label every key must start with.
    pub fn new(base_url: &str, primary_label: &str, timeout: Duration) -> PushgatewayResult<Self> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            primary_label: primary_label.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch every group through the Query API.
    ///
    /// See <https://github.com/prometheus/pushgateway#query-api>.
    pub async fn query_metrics(&self) -> PushgatewayResult<Vec<MetricsGroup>> {
        let url = self.base_url.join("/api/v1/metrics")?;
        let response = self.http.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(PushgatewayError::UnexpectedStatus {
                status: response.status(),
            });
        }
        let body = response.bytes().await?;
        parse_query_response(&body)
    }

    /// Push the `up` metric of a group.
    ///
    /// Up replaces only `up` (POST); down replaces the whole group (PUT).
    /// See <https://github.com/prometheus/pushgateway#put-method>.
    pub async fn upset(&self, key: &GroupKey, up: bool) -> PushgatewayResult<()> {
        let url = self.group_url(key)?;
        let (method, body) = if up {
            (Method::POST, "up 1\n")
        } else {
            (Method::PUT, "up 0\n")
        };
        let response = self.http.request(method, url).body(body).send().await?;
        expect_status(response.status(), StatusCode::OK)
    }

    /// Delete all metrics of a group.
    ///
    /// See <https://github.com/prometheus/pushgateway#delete-method>.
    pub async fn delete(&self, key: &GroupKey) -> PushgatewayResult<()> {
        let url = self.group_url(key)?;
        let response = self.http.delete(url).send().await?;
        expect_status(response.status(), StatusCode::ACCEPTED)
    }

    fn group_url(&self, key: &GroupKey) -> PushgatewayResult<Url> {
        if !key.starts_with_label(&self.primary_label) {
            return Err(PushgatewayError::InvalidKey {
                key: key.to_string(),
                primary: self.primary_label.clone(),
            });
        }
        Ok(self.base_url.join(&format!("/metrics/{key}"))?)
    }
}

fn expect_status(status: StatusCode, expected: StatusCode) -> PushgatewayResult<()> {
    if status == expected {
        Ok(())
    } else {
        Err(PushgatewayError::UnexpectedStatus { status })
    }
}

impl SnapshotSource for PushgatewayClient {
    async fn fetch_snapshot(&self) -> PushgatewayResult<Vec<MetricsGroup>> {
        self.query_metrics().await
    }
}

impl GroupSink for PushgatewayClient {
    async fn push_up(&self, key: &GroupKey, up: bool) -> PushgatewayResult<()> {
        self.upset(key, up).await
    }

    async fn delete_group(&self, key: &GroupKey) -> PushgatewayResult<()> {
        self.delete(key).await
    }
}
