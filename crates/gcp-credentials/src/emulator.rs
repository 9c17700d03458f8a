use std::collections::BTreeMap;
use std::sync::Arc;

use crate::credentials::{Credentials, RequestMetadata};

/// Header carrying the resource (database) scope for emulator requests.
pub const RESOURCE_PREFIX_HEADER: &str = "google-cloud-resource-prefix";

const AUTHORIZATION_HEADER: &str = "Authorization";

/// The emulator accepts this token as the owner of every resource.
const OWNER_TOKEN: &str = "Bearer owner";

/// Fixed credentials for talking to a local Firestore emulator.
///
/// The headers are built once and handed out verbatim for every request, so there's
/// nothing to refresh and nothing that can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorCredentials {
    headers: RequestMetadata,
}

impl EmulatorCredentials {
    /// `resource_prefix` is sent verbatim, and should be `projects/{id}/databases/{db}`.
    pub fn new(resource_prefix: impl Into<String>) -> Self {
        let resource_prefix = resource_prefix.into();

        let mut headers = BTreeMap::new();
        headers.insert(AUTHORIZATION_HEADER.to_owned(), vec![OWNER_TOKEN.to_owned()]);
        headers.insert(RESOURCE_PREFIX_HEADER.to_owned(), vec![resource_prefix]);

        Self {
            headers: Arc::new(headers),
        }
    }

    pub fn resource_prefix(&self) -> &str {
        self.headers
            .get(RESOURCE_PREFIX_HEADER)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Credentials for EmulatorCredentials {
    #[inline]
    fn authentication_type(&self) -> Option<&str> {
        None
    }

    #[inline]
    fn request_metadata(&self, _uri: Option<&http::Uri>) -> crate::Result<RequestMetadata> {
        Ok(Arc::clone(&self.headers))
    }

    #[inline]
    fn has_request_metadata(&self) -> bool {
        true
    }

    #[inline]
    fn has_request_metadata_only(&self) -> bool {
        true
    }

    #[inline]
    fn refresh(&self) -> crate::Result<()> {
        Ok(())
    }
}
