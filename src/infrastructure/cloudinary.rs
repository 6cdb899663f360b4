use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::media::{HostError, HostedImage, ImageHost, PreparedImage};

#[derive(Debug, Clone, Default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Unsigned preset; when empty, uploads are signed with the API secret.
    pub upload_preset: String,
    pub api_base: String,
}

pub struct CloudinaryHost {
    client: Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Request signature: parameters sorted by name, joined as `k=v&...`, with
/// the secret appended, hashed and hex encoded.
pub(crate) fn sign(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn context_value(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.replace(['|', '='], "_")))
        .collect::<Vec<_>>()
        .join("|")
}

impl CloudinaryHost {
    pub fn new(config: CloudinaryConfig, timeout: Duration) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HostError::NotConfigured(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    fn ensure_configured(&self, signed: bool) -> Result<(), HostError> {
        if self.config.cloud_name.is_empty() {
            return Err(HostError::NotConfigured("cloud name missing".to_string()));
        }
        if signed && (self.config.api_key.is_empty() || self.config.api_secret.is_empty()) {
            return Err(HostError::NotConfigured("API credentials missing".to_string()));
        }
        Ok(())
    }

    async fn send(&self, url: &str, form: Form) -> Result<reqwest::Response, HostError> {
        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HostError::Transport(format!("timed out: {e}"))
                } else {
                    HostError::Transport(e.to_string())
                }
            })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(HostError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: &PreparedImage) -> Result<HostedImage, HostError> {
        let signed = self.config.upload_preset.is_empty();
        self.ensure_configured(signed)?;

        let mut params: Vec<(&str, String)> = vec![
            ("folder", image.folder.clone()),
            ("public_id", image.public_id.clone()),
        ];
        if !image.context.is_empty() {
            params.push(("context", context_value(&image.context)));
        }

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| HostError::Malformed(e.to_string()))?;
        let mut form = Form::new().part("file", part);

        if signed {
            params.push(("timestamp", Utc::now().timestamp().to_string()));
            let signature = sign(&params, &self.config.api_secret);
            form = form
                .text("api_key", self.config.api_key.clone())
                .text("signature", signature)
                .text("signature_algorithm", "sha256");
        } else {
            form = form.text("upload_preset", self.config.upload_preset.clone());
        }
        for (k, v) in params {
            form = form.text(k, v);
        }

        let resp = self.send(&self.endpoint("upload"), form).await?;
        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| HostError::Malformed(e.to_string()))?;
        Ok(HostedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), HostError> {
        self.ensure_configured(true)?;
        let params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = sign(&params, &self.config.api_secret);
        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (k, v) in params {
            form = form.text(k, v);
        }

        let resp = self.send(&self.endpoint("destroy"), form).await?;
        let body: DestroyResponse = resp
            .json()
            .await
            .map_err(|e| HostError::Malformed(e.to_string()))?;
        match body.result.as_str() {
            // Already gone counts as deleted.
            "ok" | "not found" => Ok(()),
            other => Err(HostError::Rejected {
                status: 200,
                message: format!("destroy returned '{other}'"),
            }),
        }
    }
}
