//! The [`Credentials`] capability: anything that can supply authentication metadata for an
//! outgoing request.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Header name to ordered header values, shared and immutable once built.
pub type RequestMetadata = Arc<BTreeMap<String, Vec<String>>>;

/// A source of per-request authentication metadata.
///
/// Implementations are shared across every task issuing requests, so they need to be
/// [`Send`] + [`Sync`]. A credential whose metadata never depends on the request (see
/// [`has_request_metadata_only`]) lets transports convert the headers once and reuse them.
///
/// [`has_request_metadata_only`]: Credentials::has_request_metadata_only
pub trait Credentials: fmt::Debug + Send + Sync + 'static {
    /// The named authentication scheme, if the credential identifies as one.
    fn authentication_type(&self) -> Option<&str>;

    /// Metadata to attach to a request sent to `uri`.
    fn request_metadata(&self, uri: Option<&http::Uri>) -> crate::Result<RequestMetadata>;

    /// Whether [`Credentials::request_metadata`] returns anything at all.
    fn has_request_metadata(&self) -> bool;

    /// Whether the metadata is everything this credential contributes, i.e there's nothing
    /// derived from the request or transport.
    fn has_request_metadata_only(&self) -> bool;

    /// Refreshes any cached state.
    fn refresh(&self) -> crate::Result<()>;
}

impl<C: Credentials + ?Sized> Credentials for Arc<C> {
    #[inline]
    fn authentication_type(&self) -> Option<&str> {
        C::authentication_type(self)
    }

    #[inline]
    fn request_metadata(&self, uri: Option<&http::Uri>) -> crate::Result<RequestMetadata> {
        C::request_metadata(self, uri)
    }

    #[inline]
    fn has_request_metadata(&self) -> bool {
        C::has_request_metadata(self)
    }

    #[inline]
    fn has_request_metadata_only(&self) -> bool {
        C::has_request_metadata_only(self)
    }

    #[inline]
    fn refresh(&self) -> crate::Result<()> {
        C::refresh(self)
    }
}
