use crate::{
    config::ProbeConfig,
    health::{ProbeResult, UnhealthyCause},
    utils::errors::ProbeError,
};
use reqwest::{dns::Resolve, Client, ClientBuilder};
use std::{error::Error as StdError, future::Future, io, sync::Arc};
use tokio::{runtime::Builder, time::timeout};
use tracing::debug;

const USER_AGENT: &str = concat!("healthcheck/", env!("CARGO_PKG_VERSION"));

/// Issues the single HTTP request of a probe invocation.
pub struct HttpProber {
    client: Client,
    config: ProbeConfig,
}

impl HttpProber {
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        Self::build(client_builder(&config), config)
    }

    /// Same as [`HttpProber::new`], with host names looked up by `resolver`.
    pub fn with_resolver<R: Resolve + 'static>(
        config: ProbeConfig,
        resolver: Arc<R>,
    ) -> Result<Self, ProbeError> {
        Self::build(client_builder(&config).dns_resolver(resolver), config)
    }

    fn build(builder: ClientBuilder, config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = builder.build().map_err(|e| ProbeError::ClientInitError {
            message: format!("{:?}", e),
        })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Performs one health determination.
    ///
    /// The request is raced against the configured deadline. When the deadline wins,
    /// the in-flight request future is dropped here, which closes its socket, so nothing
    /// keeps running after this returns.
    pub async fn probe(&self) -> ProbeResult {
        let url = self.config.url();
        debug!(
            url = url.as_str(),
            timeout_ms = self.config.timeout.as_millis() as u64,
            "[Prober] Probing health endpoint"
        );

        let result = match timeout(self.config.timeout, self.client.get(&url).send()).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    ProbeResult::Healthy { status }
                } else {
                    ProbeResult::Unhealthy(UnhealthyCause::Status(status))
                }
            },
            Ok(Err(e)) if e.is_timeout() => ProbeResult::Indeterminate {
                timeout: self.config.timeout,
            },
            Ok(Err(e)) => ProbeResult::Unhealthy(UnhealthyCause::Connection(error_chain(&e))),
            Err(_) => ProbeResult::Indeterminate {
                timeout: self.config.timeout,
            },
        };

        debug!(
            url = url.as_str(),
            result = %result,
            exit_code = result.exit_code(),
            "[Prober] Probe finished"
        );
        result
    }
}

// Each invocation is its own process; nothing is gained by pooling or by routing
// a loopback request through a proxy picked up from the environment.
fn client_builder(config: &ProbeConfig) -> ClientBuilder {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .pool_max_idle_per_host(0)
        .no_proxy()
        .user_agent(USER_AGENT)
}

/// Drives `probe` on a fresh single-threaded runtime and returns as soon as it resolves.
///
/// Work still parked on the runtime's blocking pool, such as a host name lookup the
/// deadline gave up on, is abandoned rather than joined.
pub fn run_probe<F>(probe: F) -> io::Result<ProbeResult>
where
    F: Future<Output = ProbeResult>,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    let result = runtime.block_on(probe);
    runtime.shutdown_background();
    Ok(result)
}

/// Convenience wrapper for a one-off probe. Client setup failures count as unhealthy.
pub async fn probe_once(config: ProbeConfig) -> ProbeResult {
    match HttpProber::new(config) {
        Ok(prober) => prober.probe().await,
        Err(e) => ProbeResult::Unhealthy(UnhealthyCause::Connection(e.to_string())),
    }
}

/// Flattens an error and its sources into one line, e.g.
/// `error sending request: client error (Connect): Connection refused`.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fmt, time::Duration};

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let error = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "Connection refused",
                source: None,
            })),
        };
        assert_eq!(
            error_chain(&error),
            "error sending request: Connection refused"
        );
    }

    #[tokio::test]
    async fn test_prober_keeps_config() {
        let config = ProbeConfig::default().with_timeout(Duration::from_millis(100));
        let prober = HttpProber::new(config.clone()).unwrap();
        assert_eq!(prober.config(), &config);
    }
}
