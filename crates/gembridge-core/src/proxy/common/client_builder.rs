use gembridge_types::{ConfigError, UpstreamProxyConfig};

/// Build the shared outbound HTTP client.
///
/// No request timeout is set: streamed generations can run for minutes.
/// Without an explicit proxy, reqwest picks up `HTTPS_PROXY`/`HTTP_PROXY`.
pub fn build_http_client(upstream_proxy: &UpstreamProxyConfig) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder().tcp_nodelay(true);

    if upstream_proxy.enabled && !upstream_proxy.url.is_empty() {
        let proxy = reqwest::Proxy::all(&upstream_proxy.url).map_err(|e| {
            ConfigError::ValidationError {
                field: "upstream.proxy.url".to_string(),
                message: format!("Invalid upstream proxy url: {}", e),
            }
        })?;
        tracing::info!("Routing provider traffic through {}", upstream_proxy.url);
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| ConfigError::ValidationError {
        field: "upstream".to_string(),
        message: format!("Failed to build HTTP client: {}", e),
    })
}
