//! Gateway URL resolution
//!
//! The socket URL is looked up once through the unauthenticated REST endpoint
//! (or taken from configuration) and shared by every shard afterwards.

use chat_common::ClientConfig;
use chat_http::RestClient;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Payload compression requested from the gateway
pub const GATEWAY_COMPRESSION: &str = "zlib-stream";

/// Payload encoding requested from the gateway
pub const GATEWAY_ENCODING: &str = "json";

/// Process-wide cached gateway URL
pub struct GatewayUrl {
    rest: RestClient,
    configured: Option<String>,
    version: u8,
    resolved: OnceCell<String>,
}

impl GatewayUrl {
    pub fn new(rest: RestClient, configured: Option<String>, version: u8) -> Self {
        Self {
            rest,
            configured,
            version,
            resolved: OnceCell::new(),
        }
    }

    pub fn from_config(config: &ClientConfig, rest: RestClient) -> Self {
        Self::new(rest, config.gateway_url.clone(), config.gateway_version)
    }

    /// Socket URL including the query parameters
    ///
    /// The first successful call performs the lookup; later calls reuse it.
    /// A failed lookup is not cached.
    pub async fn resolve(&self) -> GatewayResult<String> {
        let url = self
            .resolved
            .get_or_try_init(|| async {
                let base = match &self.configured {
                    Some(url) => url.clone(),
                    None => {
                        let url = self.rest.gateway_url().await?;
                        tracing::debug!(url = %url, "Resolved gateway url");
                        url
                    }
                };
                Ok::<_, GatewayError>(with_query(&base, self.version)?)
            })
            .await?;
        Ok(url.clone())
    }

    /// Already resolved URL, if any
    pub fn get(&self) -> Option<&str> {
        self.resolved.get().map(String::as_str)
    }
}

/// Append the gateway query to `base`, keeping any query it already has
///
/// A bare host gets the root path, so the handshake targets `/?...`.
fn with_query(base: &str, version: u8) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("compress", GATEWAY_COMPRESSION)
        .append_pair("encoding", GATEWAY_ENCODING)
        .append_pair("v", &version.to_string());
    Ok(url.into())
}
