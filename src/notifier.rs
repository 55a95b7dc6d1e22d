use std::{sync::Arc, time::Duration};

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Client, Method, Proxy,
};
use serde::Deserialize;

use crate::{
    clock::Clock,
    constants::{API_V1_URL, FRAGMENT_API_URL},
    logger::Journal,
};

/// Off-chain side effects of the claim loop. Best effort: nothing here can fail the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Mirrors a confirmed claim transaction into the points backend.
    async fn sync_claim(&self, address: Address, tx_hash: TxHash);

    async fn claim_badges(&self, address: Address);

    async fn report_points(&self, address: Address);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRequest {
    pub method: Method,
    pub url: String,
    pub tag: &'static str,
    pub delay_after: Duration,
}

impl PlannedRequest {
    fn new(method: Method, url: String, tag: &'static str) -> Self {
        Self {
            method,
            url,
            tag,
            delay_after: Duration::ZERO,
        }
    }

    fn then_wait(mut self, secs: u64) -> Self {
        self.delay_after = Duration::from_secs(secs);
        self
    }
}

pub fn claim_sync_plan(address: Address, tx_hash: TxHash) -> Vec<PlannedRequest> {
    let balance_url = format!("{FRAGMENT_API_URL}/v2/fragmentz-v2/balance/{address}");
    let claim_url = format!("{FRAGMENT_API_URL}/v2/fragmentz-v2/claim/{tx_hash}");

    vec![
        PlannedRequest::new(Method::OPTIONS, balance_url.clone(), "OPTIONS Balance"),
        PlannedRequest::new(Method::OPTIONS, claim_url.clone(), "OPTIONS Claim"),
        PlannedRequest::new(Method::GET, balance_url, "GET Balance"),
        PlannedRequest::new(Method::POST, claim_url, "POST Claim"),
    ]
}

pub fn badge_plan(address: Address, badge_answer: &str, badge_ids: &[u32]) -> Vec<PlannedRequest> {
    let subscription_url = format!("{API_V1_URL}/auth/get-blog-subscription-point");
    let quest_url = format!("{API_V1_URL}/auth/get-reward-quest-history");
    let answer_url = format!("{FRAGMENT_API_URL}/v1/badges/checkAnswer/{badge_answer}");

    let mut plan = vec![
        PlannedRequest::new(Method::OPTIONS, subscription_url.clone(), "OPTIONS"),
        PlannedRequest::new(Method::GET, subscription_url, "GET").then_wait(2),
        PlannedRequest::new(Method::OPTIONS, quest_url.clone(), "OPTIONS"),
        PlannedRequest::new(Method::GET, quest_url, "GET").then_wait(2),
        PlannedRequest::new(Method::OPTIONS, answer_url.clone(), "OPTIONS"),
        PlannedRequest::new(Method::GET, answer_url, "GET").then_wait(5),
    ];

    for badge_id in badge_ids {
        let claim_url = format!("{FRAGMENT_API_URL}/v1/badges/claim/{address}/{badge_id}");
        plan.push(PlannedRequest::new(
            Method::OPTIONS,
            claim_url.clone(),
            "OPTIONS Claim",
        ));
        plan.push(PlannedRequest::new(Method::POST, claim_url, "POST Claim").then_wait(5));
    }

    plan
}

pub fn points_url(address: Address) -> String {
    format!("{API_V1_URL}/orbit-db/total-node-info/{address}")
}

#[derive(Deserialize, Debug)]
struct NodeInfoResponse {
    data: Option<NodeInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NodeInfo {
    frag_point: serde_json::Value,
}

pub fn extract_frag_points(response_text: &str) -> eyre::Result<serde_json::Value> {
    let response: NodeInfoResponse = serde_json::from_str(response_text)?;

    response
        .data
        .map(|data| data.frag_point)
        .ok_or_else(|| eyre::eyre!("Data format unexpected or missing"))
}

pub async fn send_http_request(
    client: &Client,
    method: Method,
    url: &str,
    headers: Option<&HeaderMap>,
) -> eyre::Result<String> {
    let mut request = client.request(method, url);

    if let Some(headers) = headers {
        request = request.headers(headers.clone());
    }

    let response = request.send().await?.error_for_status()?;
    let text = response.text().await?;

    Ok(text)
}

pub struct HttpNotifier {
    client: Client,
    headers: HeaderMap,
    journal: Arc<dyn Journal>,
    clock: Arc<dyn Clock>,
    badge_answer: String,
    badge_ids: Vec<u32>,
}

impl HttpNotifier {
    pub fn new(
        bearer_token: &str,
        proxy: Option<&str>,
        badge_answer: String,
        badge_ids: Vec<u32>,
        journal: Arc<dyn Journal>,
        clock: Arc<dyn Clock>,
    ) -> eyre::Result<Self> {
        let client = match proxy {
            Some(proxy) => Client::builder().proxy(Proxy::all(proxy)?).build()?,
            None => Client::new(),
        };

        Ok(Self {
            client,
            headers: get_headers(bearer_token)?,
            journal,
            clock,
            badge_answer,
            badge_ids,
        })
    }

    async fn execute(&self, plan: Vec<PlannedRequest>) {
        for request in plan {
            match send_http_request(
                &self.client,
                request.method.clone(),
                &request.url,
                Some(&self.headers),
            )
            .await
            {
                Ok(_) => self
                    .journal
                    .record(request.tag, &format!("Successful for {}", request.url)),
                Err(e) => self
                    .journal
                    .record(request.tag, &format!("Failed for {}: {e}", request.url)),
            }

            if !request.delay_after.is_zero() {
                self.clock.sleep(request.delay_after).await;
            }
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn sync_claim(&self, address: Address, tx_hash: TxHash) {
        self.execute(claim_sync_plan(address, tx_hash)).await;
    }

    async fn claim_badges(&self, address: Address) {
        self.execute(badge_plan(address, &self.badge_answer, &self.badge_ids))
            .await;
    }

    async fn report_points(&self, address: Address) {
        let points = send_http_request(&self.client, Method::GET, &points_url(address), None)
            .await
            .and_then(|text| extract_frag_points(&text));

        match points {
            Ok(points) => tracing::info!("Address: {address}, AG Points: {points}"),
            Err(e) => tracing::error!("Failed to fetch fragPoint for {address}: {e}"),
        }
    }
}

fn get_headers(bearer_token: &str) -> eyre::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {bearer_token}"))?,
    );
    headers.insert(
        HeaderName::from_static("accept"),
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        HeaderName::from_static("origin"),
        HeaderValue::from_static("https://rivalz.ai"),
    );
    headers.insert(
        HeaderName::from_static("referer"),
        HeaderValue::from_static("https://rivalz.ai/"),
    );
    headers.insert(
        HeaderName::from_static("user-agent"),
        HeaderValue::from_static("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36"),
    );

    Ok(headers)
}
