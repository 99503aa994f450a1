//! Buffer sink — queues posts on a connected social profile.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BufferConfig;
use crate::error::SinkError;
use crate::publish::render::RenderedPost;
use crate::sinks::{DeliveryMode, Sink};

pub struct BufferSink {
    config: BufferConfig,
    http: reqwest::Client,
}

impl BufferSink {
    pub fn new(config: BufferConfig, timeout: Duration) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Delivery {
                sink: "buffer".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { config, http })
    }
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    updates: Vec<CreatedUpdate>,
}

#[derive(Debug, Deserialize)]
struct CreatedUpdate {
    id: String,
}

#[async_trait]
impl Sink for BufferSink {
    fn name(&self) -> &'static str {
        "buffer"
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Buffer
    }

    async fn deliver(&self, post: &RenderedPost) -> Result<String, SinkError> {
        let url = format!("{}/updates/create.json", self.config.api_base);
        let form = [
            ("text", post.text.as_str()),
            ("profile_ids[]", self.config.profile_id.as_str()),
            ("access_token", self.config.access_token.expose_secret()),
            ("now", "true"),
        ];

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SinkError::Delivery {
                sink: "buffer".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                sink: "buffer".to_string(),
                code: status.as_u16(),
            });
        }

        // Past this point the post is live. An unreadable body must not
        // surface as a failure or the caller would fall through to the
        // next sink and double-post.
        let post_id = match response.json::<CreateResponse>().await {
            Ok(body) => body.updates.into_iter().next().map(|u| u.id),
            Err(e) => {
                warn!(error = %e, "Buffer accepted the post but the response was unreadable");
                None
            }
        };
        let post_id =
            post_id.unwrap_or_else(|| format!("buffer_{}", Uuid::new_v4().simple()));

        info!(content_id = %post.content_id, post_id = %post_id, "Queued post on Buffer");
        Ok(post_id)
    }
}

/// A connected Buffer profile.
#[derive(Debug, Clone, Deserialize)]
pub struct BufferProfile {
    pub id: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub formatted_username: String,
}

/// List the profiles connected to a Buffer account. Used by the
/// `buffer-profiles` command to find the profile id to configure.
pub async fn list_profiles(
    access_token: &str,
    api_base: &str,
    timeout: Duration,
) -> Result<Vec<BufferProfile>, SinkError> {
    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SinkError::Delivery {
            sink: "buffer".to_string(),
            reason: e.to_string(),
        })?;

    let url = format!("{api_base}/profiles.json");
    let response = http
        .get(&url)
        .query(&[("access_token", access_token)])
        .send()
        .await
        .map_err(|e| SinkError::Delivery {
            sink: "buffer".to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SinkError::Status {
            sink: "buffer".to_string(),
            code: status.as_u16(),
        });
    }

    response.json().await.map_err(|e| SinkError::Delivery {
        sink: "buffer".to_string(),
        reason: format!("profile list parse: {e}"),
    })
}
