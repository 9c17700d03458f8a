//! [`FirestoreStub`], the raw gRPC client the data-access template issues calls through.
use std::sync::Arc;

use gcp_credentials::{Credentials, CredentialsChannel};
use tonic::client::Grpc;
use tonic::transport::Channel;

/// The transport every Firestore call goes over: a channel that attaches credential metadata.
pub type FirestoreChannel = CredentialsChannel<Channel>;

/// Newtype around the generic [`Grpc`] client that generated Firestore clients wrap.
#[derive(Debug, Clone)]
pub struct FirestoreStub {
    channel: FirestoreChannel,
    inner: Grpc<FirestoreChannel>,
}

impl FirestoreStub {
    /// Wraps `channel` so every call carries the metadata from `credentials`.
    pub fn new(channel: Channel, credentials: Arc<dyn Credentials>) -> crate::Result<Self> {
        let channel = CredentialsChannel::new(channel, credentials)?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: FirestoreChannel) -> Self {
        Self {
            inner: Grpc::new(channel.clone()),
            channel,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn Credentials> {
        self.channel.credentials()
    }

    #[inline]
    pub fn inner(&self) -> &Grpc<FirestoreChannel> {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut Grpc<FirestoreChannel> {
        &mut self.inner
    }

    #[inline]
    pub fn into_inner(self) -> Grpc<FirestoreChannel> {
        self.inner
    }

    /// The credentialed channel, for building generated clients over the same transport.
    pub fn channel(&self) -> FirestoreChannel {
        self.channel.clone()
    }
}
