//! [`FirestoreOptions`], everything needed to construct a Firestore client.
use std::fmt;
use std::sync::Arc;

use gcp_credentials::Credentials;

use crate::channel::ChannelOptions;

#[derive(Clone)]
pub struct FirestoreOptions {
    credentials: Arc<dyn Credentials>,
    project_id: Arc<str>,
    channel: ChannelOptions,
}

impl fmt::Debug for FirestoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreOptions")
            .field("project_id", &self.project_id)
            .field("channel", &self.channel)
            .field("auth_type", &self.credentials.authentication_type())
            .finish_non_exhaustive()
    }
}

impl FirestoreOptions {
    pub fn new(
        credentials: Arc<dyn Credentials>,
        project_id: impl Into<Arc<str>>,
        channel: ChannelOptions,
    ) -> Self {
        Self {
            credentials,
            project_id: project_id.into(),
            channel,
        }
    }

    pub fn builder() -> FirestoreOptionsBuilder {
        FirestoreOptionsBuilder::default()
    }

    pub fn credentials(&self) -> &Arc<dyn Credentials> {
        &self.credentials
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn channel_options(&self) -> &ChannelOptions {
        &self.channel
    }

    pub fn resource_prefix(&self) -> String {
        crate::path::resource_prefix(&self.project_id)
    }

    /// Builds a lazily connecting stub from these options. Needs to be called from within a
    /// tokio runtime.
    #[cfg(feature = "template")]
    pub fn connect_lazy(&self) -> crate::Result<crate::FirestoreStub> {
        let channel = self.channel.connect_lazy()?;
        crate::FirestoreStub::new(channel, Arc::clone(&self.credentials))
    }
}

#[derive(Debug, Default)]
pub struct FirestoreOptionsBuilder {
    credentials: Option<Arc<dyn Credentials>>,
    project_id: Option<String>,
    channel: Option<ChannelOptions>,
}

impl FirestoreOptionsBuilder {
    pub fn credentials(mut self, credentials: Arc<dyn Credentials>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn channel_options(mut self, channel: ChannelOptions) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Without explicit [`ChannelOptions`], the client targets production Firestore over TLS.
    pub fn build(self) -> crate::Result<FirestoreOptions> {
        let project_id = self
            .project_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(crate::Error::MissingProjectId)?;

        let credentials = self.credentials.ok_or(crate::Error::MissingCredentials)?;

        let channel = self
            .channel
            .unwrap_or_else(|| ChannelOptions::new(FIRESTORE_ENDPOINT));

        Ok(FirestoreOptions::new(credentials, project_id, channel))
    }
}

/// The production Firestore endpoint.
pub const FIRESTORE_ENDPOINT: &str = "firestore.googleapis.com:443";
