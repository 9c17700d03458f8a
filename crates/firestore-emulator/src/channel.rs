//! [`ChannelOptions`], describing how to build the gRPC channel a Firestore client talks over.
use std::time::Duration;

use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Error as TransportError};

/// Constructs a user agent string in the form `{PKG_NAME}/{PKG_VERSION}`
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    endpoint: String,
    user_agent: Option<String>,
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
    plaintext: bool,
}

impl ChannelOptions {
    /// Options for a channel to `endpoint`, either a bare `host:port` or a full uri.
    ///
    /// Defaults to TLS, call [`ChannelOptions::use_plaintext`] to override it.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_agent: None,
            connect_timeout: None,
            timeout: None,
            plaintext: false,
        }
    }

    /// Disables TLS, which is what the emulator expects.
    pub fn use_plaintext(mut self) -> Self {
        self.plaintext = true;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The target as given, i.e `localhost:8080`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_plaintext(&self) -> bool {
        self.plaintext
    }

    /// The full uri, with a scheme matching the transport if one wasn't given.
    pub fn uri(&self) -> String {
        if self.endpoint.contains("://") {
            return self.endpoint.clone();
        }

        let scheme = if self.plaintext { "http" } else { "https" };
        format!("{scheme}://{}", self.endpoint)
    }

    fn domain(&self) -> Option<&str> {
        let no_scheme = self
            .endpoint
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.endpoint);

        let authority = no_scheme
            .split_once('/')
            .map(|(authority, _)| authority)
            .unwrap_or(no_scheme);

        let host = authority
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(authority);

        (!host.is_empty()).then_some(host)
    }

    pub fn build_endpoint(&self) -> Result<Endpoint, TransportError> {
        let mut endpoint = Endpoint::from_shared(self.uri())?
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))?;

        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        if let Some(timeout) = self.timeout {
            endpoint = endpoint.timeout(timeout);
        }

        if !self.plaintext {
            let mut config = ClientTlsConfig::new().with_enabled_roots();
            if let Some(domain) = self.domain() {
                config = config.domain_name(domain);
            }

            endpoint = endpoint.tls_config(config)?;
        }

        Ok(endpoint)
    }

    pub async fn connect(&self) -> Result<Channel, TransportError> {
        self.build_endpoint()?.connect().await
    }

    /// Builds the channel without connecting. Needs to be called from within a tokio runtime.
    pub fn connect_lazy(&self) -> Result<Channel, TransportError> {
        Ok(self.build_endpoint()?.connect_lazy())
    }
}
