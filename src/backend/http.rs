//! HTTP implementation of the backend collaborator
//!
//! Talks to a PostgREST-style endpoint: `actions` holds event rows,
//! `event_config` holds the display-start-time value, `users` maps client
//! keys to display names. The API key, when configured, rides along as a
//! bearer token. All calls carry a request timeout so a slow backend can
//! never wedge the ingestion loop.

use super::{EventBackend, NewAction};
use crate::engine::types::RawAction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ConfigRow {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    display_name: Option<String>,
}

pub struct HttpEventBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpEventBackend {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.to_string()),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }
}

#[async_trait]
impl EventBackend for HttpEventBackend {
    async fn fetch_display_cutoff(
        &self,
    ) -> Result<Option<DateTime<Utc>>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .get("/event_config?key=eq.display_start_time&select=value")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("event_config query failed: {}", response.status()).into());
        }

        let rows: Vec<ConfigRow> = response.json().await?;
        let value = match rows.into_iter().next().and_then(|r| r.value) {
            Some(v) => v,
            None => return Ok(None),
        };
        let cutoff = DateTime::parse_from_rfc3339(&value)?.with_timezone(&Utc);
        Ok(Some(cutoff))
    }

    async fn fetch_recent(
        &self,
        cutoff: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<RawAction>, Box<dyn std::error::Error + Send + Sync>> {
        let mut path = format!(
            "/actions?select=*&order=created_at.desc&limit={}",
            limit
        );
        if let Some(cutoff) = cutoff {
            path.push_str(&format!("&created_at=gte.{}", cutoff.to_rfc3339()));
        }

        let response = self.get(&path).send().await?;
        if !response.status().is_success() {
            return Err(format!("actions query failed: {}", response.status()).into());
        }

        let rows: Vec<RawAction> = response.json().await?;
        Ok(rows)
    }

    async fn resolve_display_name(
        &self,
        client_key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .get(&format!(
                "/users?client_key=eq.{}&select=display_name",
                client_key
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("users query failed: {}", response.status()).into());
        }

        let rows: Vec<UserRow> = response.json().await?;
        Ok(rows.into_iter().next().and_then(|r| r.display_name))
    }

    async fn insert_action(
        &self,
        action: NewAction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut req = self
            .client
            .post(format!("{}/actions", self.base_url))
            .json(&action);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            return Err(format!("action insert failed: {}", response.status()).into());
        }
        Ok(())
    }
}
