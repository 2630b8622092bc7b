//! JSON-RPC client for the EOS command API.
//!
//! Commands are posted to `/command-api` as a single `runCmds` request.
//! Show commands run behind an `enable` prefix and configuration commands are
//! wrapped in `enable`/`configure`/`end`; the replies to those wrapper
//! commands are stripped so callers see exactly one reply per command they
//! issued.

use super::{Eapi, Format};
use crate::config::{ConnectionConfig, Transport};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Default eAPI HTTPS port
pub const EAPI_DEFAULT_HTTPS_PORT: u16 = 443;

/// Default eAPI HTTP port
pub const EAPI_DEFAULT_HTTP_PORT: u16 = 80;

/// Default timeout for eAPI requests (seconds)
pub const EAPI_DEFAULT_TIMEOUT: u64 = 30;

// ============================================================================
// Wire Types
// ============================================================================

/// A command as sent on the wire. `enable` carries its password as input.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum EapiCommand {
    Simple(String),
    WithInput { cmd: String, input: String },
}

#[derive(Debug, Serialize)]
struct EapiParams {
    version: u32,
    cmds: Vec<EapiCommand>,
    format: &'static str,
}

#[derive(Debug, Serialize)]
struct EapiRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: EapiParams,
    id: String,
}

#[derive(Debug, Deserialize)]
struct EapiErrorData {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EapiError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct EapiResponse {
    result: Option<Vec<Value>>,
    error: Option<EapiError>,
}

impl EapiError {
    fn into_error(self) -> Error {
        let errors = self
            .data
            .into_iter()
            .filter_map(|d| serde_json::from_value::<EapiErrorData>(d).ok())
            .flat_map(|d| d.errors)
            .collect();

        Error::Eapi {
            code: self.code,
            message: self.message,
            errors,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Blocking eAPI client for one node.
#[derive(Debug, Clone)]
pub struct EapiClient {
    http: Client,
    url: Url,
    username: String,
    password: String,
    enable_password: Option<String>,
}

impl EapiClient {
    /// Builds a client from connection settings.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig {
                key: "connection.host".to_string(),
                message: "a host is required for eAPI transport".to_string(),
            })?;

        Ok(Self {
            http: build_http_client(config)?,
            url: build_eapi_url(config, host)?,
            username: config.username.clone(),
            password: config.password.clone(),
            enable_password: config.enable_password.clone(),
        })
    }

    /// The endpoint this client posts to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn enable_command(&self) -> EapiCommand {
        match &self.enable_password {
            Some(password) => EapiCommand::WithInput {
                cmd: "enable".to_string(),
                input: password.clone(),
            },
            None => EapiCommand::Simple("enable".to_string()),
        }
    }

    /// Posts one `runCmds` request and returns every reply.
    fn run_cmds(&self, cmds: Vec<EapiCommand>, format: Format) -> Result<Vec<Value>> {
        let request = EapiRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: EapiParams {
                version: 1,
                cmds,
                format: format.as_str(),
            },
            id: uuid::Uuid::new_v4().to_string(),
        };
        trace!(id = %request.id, url = %self.url, "posting runCmds");

        let response = self
            .http
            .post(self.url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .map_err(|e| Error::transport(format!("eAPI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::transport(format!(
                "eAPI returned error status {}: {}",
                status, body
            )));
        }

        let reply: EapiResponse = response
            .json()
            .map_err(|e| Error::transport(format!("Failed to parse eAPI response: {}", e)))?;

        if let Some(error) = reply.error {
            return Err(error.into_error());
        }

        reply
            .result
            .ok_or_else(|| Error::transport("eAPI returned no result"))
    }
}

impl Eapi for EapiClient {
    fn enable(&self, commands: &[String], format: Format) -> Result<Vec<Value>> {
        debug!(?commands, %format, "enable");
        let mut cmds = vec![self.enable_command()];
        cmds.extend(commands.iter().cloned().map(EapiCommand::Simple));

        let mut replies = self.run_cmds(cmds, format)?;
        replies.drain(..1.min(replies.len()));
        Ok(replies)
    }

    fn config(&self, commands: &[String]) -> Result<Vec<Value>> {
        debug!(?commands, "config");
        let mut cmds = vec![
            self.enable_command(),
            EapiCommand::Simple("configure".to_string()),
        ];
        cmds.extend(commands.iter().cloned().map(EapiCommand::Simple));
        cmds.push(EapiCommand::Simple("end".to_string()));

        let replies = self.run_cmds(cmds, Format::Json)?;
        Ok(strip_wrapper_replies(replies))
    }
}

/// Drops the `enable`, `configure` and `end` replies around a config batch.
fn strip_wrapper_replies(mut replies: Vec<Value>) -> Vec<Value> {
    if replies.len() < 3 {
        return Vec::new();
    }
    replies.pop();
    replies.drain(..2);
    replies
}

fn build_http_client(config: &ConnectionConfig) -> Result<Client> {
    let builder = Client::builder().timeout(Duration::from_secs(config.timeout));

    let builder = if config.transport == Transport::Https && !config.validate_certs {
        builder.danger_accept_invalid_certs(true)
    } else {
        builder
    };

    builder
        .build()
        .map_err(|e| Error::transport(format!("Failed to create HTTP client: {}", e)))
}

fn build_eapi_url(config: &ConnectionConfig, host: &str) -> Result<Url> {
    let port = config.port.unwrap_or(match config.transport {
        Transport::Https => EAPI_DEFAULT_HTTPS_PORT,
        Transport::Http => EAPI_DEFAULT_HTTP_PORT,
    });
    let raw = format!("{}://{}:{}/command-api", config.transport, host, port);

    Url::parse(&raw).map_err(|e| Error::InvalidConfig {
        key: "connection.host".to_string(),
        message: format!("'{}' does not form a valid URL: {}", raw, e),
    })
}
