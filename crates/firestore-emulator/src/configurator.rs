//! Decides whether to wire up the emulator, and builds the pieces if so.
use std::sync::Arc;

use gcp_credentials::{Credentials, EmulatorCredentials};

use crate::channel::ChannelOptions;
use crate::config::FirestoreEmulatorConfig;
use crate::options::FirestoreOptions;
use crate::path;
#[cfg(feature = "template")]
use crate::{stub::FirestoreStub, template::FirestoreTemplate};

/// Everything built for an enabled emulator. The caller owns these for the rest of the
/// application's lifetime, there's no global registry.
#[derive(Debug, Clone)]
pub struct EmulatorComponents {
    pub options: FirestoreOptions,
    #[cfg(feature = "template")]
    pub stub: FirestoreStub,
    #[cfg(feature = "template")]
    pub template: FirestoreTemplate,
}

/// Builds each emulator component from a validated config.
///
/// Each builder method constructs a fresh component, nothing is cached here. Callers that
/// want to substitute their own stub can skip [`EmulatorConfigurator::firestore_stub`] and
/// hand theirs to [`EmulatorConfigurator::firestore_template`].
#[derive(Debug, Clone)]
pub struct EmulatorConfigurator {
    host_port: Arc<str>,
    project_id: Arc<str>,
    resource_prefix: Arc<str>,
    credentials: Arc<EmulatorCredentials>,
}

impl EmulatorConfigurator {
    /// Fails if there's no project id, before anything touching the network is built.
    pub fn new(config: &FirestoreEmulatorConfig) -> crate::Result<Self> {
        let Some(project_id) = config.project_id() else {
            tracing::error!(
                message = "firestore emulator enabled without a project id",
                host_port = %config.host_port,
            );
            return Err(crate::Error::MissingProjectId);
        };

        let resource_prefix: Arc<str> = Arc::from(path::resource_prefix(project_id));
        let credentials = Arc::new(EmulatorCredentials::new(&*resource_prefix));

        Ok(Self {
            host_port: Arc::from(config.host_port.as_str()),
            project_id: Arc::from(project_id),
            resource_prefix,
            credentials,
        })
    }

    pub fn host_port(&self) -> &str {
        &self.host_port
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `projects/{project_id}/databases/(default)`
    pub fn resource_prefix(&self) -> &str {
        &self.resource_prefix
    }

    pub fn credentials(&self) -> Arc<dyn Credentials> {
        self.credentials.clone()
    }

    fn channel_options(&self) -> ChannelOptions {
        ChannelOptions::new(&*self.host_port).use_plaintext()
    }

    /// Client options pointing at the emulator over plaintext, authenticated with the
    /// emulator credentials.
    pub fn firestore_options(&self) -> FirestoreOptions {
        FirestoreOptions::new(
            self.credentials(),
            Arc::clone(&self.project_id),
            self.channel_options(),
        )
    }

    /// A separate lazily connected plaintext channel to the emulator, carrying the same
    /// credentials. Needs to be called from within a tokio runtime.
    #[cfg(feature = "template")]
    pub fn firestore_stub(&self) -> crate::Result<FirestoreStub> {
        let channel = self.channel_options().connect_lazy()?;
        FirestoreStub::new(channel, self.credentials())
    }

    /// A template rooted at `{resource_prefix}/documents`, with stream tokens disabled.
    #[cfg(feature = "template")]
    pub fn firestore_template(&self, stub: FirestoreStub) -> FirestoreTemplate {
        let mut template = FirestoreTemplate::new(stub, path::documents_path(&self.project_id));
        template.set_using_stream_tokens(false);
        template
    }

    /// Builds every component.
    pub fn build(&self) -> crate::Result<EmulatorComponents> {
        let options = self.firestore_options();

        #[cfg(feature = "template")]
        let (stub, template) = {
            let stub = self.firestore_stub()?;
            let template = self.firestore_template(stub.clone());
            (stub, template)
        };

        tracing::info!(
            message = "configured firestore emulator",
            host_port = %self.host_port,
            project_id = %self.project_id,
            template = cfg!(feature = "template"),
        );

        Ok(EmulatorComponents {
            options,
            #[cfg(feature = "template")]
            stub,
            #[cfg(feature = "template")]
            template,
        })
    }
}

/// Builds the emulator components if `config` enables the emulator, otherwise returns
/// `Ok(None)` without looking at anything else.
///
/// With the `template` feature, this builds channels, so it needs to be called from within a
/// tokio runtime.
pub fn configure(config: &FirestoreEmulatorConfig) -> crate::Result<Option<EmulatorComponents>> {
    if !config.enabled {
        tracing::debug!("firestore emulator disabled, skipping");
        return Ok(None);
    }

    EmulatorConfigurator::new(config)?.build().map(Some)
}
