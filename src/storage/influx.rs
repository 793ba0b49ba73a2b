//! InfluxDB 1.x HTTP sink.
//!
//! Every metric row that carries at least one field becomes one point:
//! measurement = metric name, tags = row tags overlaid by host tags, fields
//! as collected, timestamp in seconds.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use url::Url;

use crate::config::InfluxConfig;
use crate::data::{Data, FieldValue};

use super::SinkError;

/// Client for the `/ping` and `/write` endpoints.
#[derive(Debug, Clone)]
pub struct InfluxSink {
    client: reqwest::Client,
    ping_url: Url,
    write_url: Url,
    username: Option<String>,
    password: Option<String>,
    ping_timeout: Duration,
    write_timeout: Duration,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Result<Self, SinkError> {
        let base = Url::parse(&config.url)?;
        let root = base.path().trim_end_matches('/').to_string();

        let mut ping_url = base.clone();
        ping_url.set_path(&format!("{root}/ping"));

        let mut write_url = base;
        write_url.set_path(&format!("{root}/write"));
        write_url
            .query_pairs_mut()
            .clear()
            .append_pair("db", &config.database)
            .append_pair("precision", "s");

        Ok(Self {
            client: reqwest::Client::new(),
            ping_url,
            write_url,
            username: config.username.clone(),
            password: config.password.clone(),
            ping_timeout: config.ping_timeout,
            write_timeout: config.write_timeout,
        })
    }

    pub fn write_url(&self) -> &Url {
        &self.write_url
    }

    /// `GET /ping`, success on any 2xx.
    pub async fn ping(&self) -> bool {
        let result = self
            .client
            .get(self.ping_url.clone())
            .timeout(self.ping_timeout)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(url = %self.ping_url, status = %response.status(), "InfluxDB ping rejected");
                false
            }
            Err(e) => {
                tracing::warn!(url = %self.ping_url, error = %e, "InfluxDB ping failed");
                false
            }
        }
    }

    /// Post a batch as line protocol.
    pub async fn write(&self, batch: &[Data]) -> Result<(), SinkError> {
        let body = line_protocol(batch);
        if body.is_empty() {
            return Ok(());
        }

        let mut request = self
            .client
            .post(self.write_url.clone())
            .timeout(self.write_timeout)
            .body(body);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Render a batch as InfluxDB line protocol, one point per line.
///
/// Unsealed records and rows without fields are skipped.
pub fn line_protocol(batch: &[Data]) -> String {
    let mut out = String::new();
    for data in batch {
        let Some(timestamp) = data.timestamp else {
            continue;
        };
        let seconds = timestamp.timestamp();

        for (measurement, metric) in &data.metrics {
            for (index, fields) in &metric.fields {
                let fields: Vec<String> = fields
                    .iter()
                    .filter_map(|(name, value)| {
                        format_field(value).map(|v| format!("{}={v}", escape_key(name)))
                    })
                    .collect();
                if fields.is_empty() {
                    continue;
                }

                let mut tags: BTreeMap<&str, &str> = BTreeMap::new();
                if let Some(row) = metric.row_tags(index) {
                    tags.extend(row.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                }
                tags.extend(data.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())));

                out.push_str(&escape_measurement(measurement));
                for (name, value) in tags.iter().filter(|(_, v)| !v.is_empty()) {
                    let _ = write!(out, ",{}={}", escape_key(name), escape_key(value));
                }
                let _ = writeln!(out, " {} {seconds}", fields.join(","));
            }
        }
    }
    out
}

fn format_field(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Boolean(b) => Some(b.to_string()),
        FieldValue::Integer(i) => Some(format!("{i}i")),
        FieldValue::Float(f) if f.is_finite() => Some(f.to_string()),
        FieldValue::Float(_) => None,
        FieldValue::Text(s) => Some(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))),
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escaping for tag keys, tag values and field keys.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
