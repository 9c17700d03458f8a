//! [`FirestoreTemplate`], a stub bound to a document root.
use std::sync::Arc;

use crate::stub::FirestoreStub;

/// A [`FirestoreStub`] bound to a parent resource (normally
/// `projects/{id}/databases/(default)/documents`), used to build document and collection
/// names for requests.
#[derive(Debug, Clone)]
pub struct FirestoreTemplate {
    stub: FirestoreStub,
    parent: Arc<str>,
    /// Whether write streams resume using stream tokens. The emulator doesn't support
    /// this reliably, so it's disabled for emulator templates.
    using_stream_tokens: bool,
}

impl FirestoreTemplate {
    pub fn new(stub: FirestoreStub, parent: impl Into<Arc<str>>) -> Self {
        Self {
            stub,
            parent: parent.into(),
            using_stream_tokens: true,
        }
    }

    pub fn set_using_stream_tokens(&mut self, using_stream_tokens: bool) {
        self.using_stream_tokens = using_stream_tokens;
    }

    pub fn is_using_stream_tokens(&self) -> bool {
        self.using_stream_tokens
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn stub(&self) -> &FirestoreStub {
        &self.stub
    }

    pub fn stub_mut(&mut self) -> &mut FirestoreStub {
        &mut self.stub
    }

    /// `{parent}/{collection}`
    pub fn collection_path(&self, collection: &str) -> String {
        join(&self.parent, &[collection])
    }

    /// `{parent}/{collection}/{document_id}`
    pub fn document_name(&self, collection: &str, document_id: &str) -> String {
        join(&self.parent, &[collection, document_id])
    }
}

fn join(parent: &str, components: &[&str]) -> String {
    let len = parent.len() + components.iter().map(|c| c.len() + 1).sum::<usize>();
    let mut dst = String::with_capacity(len);

    dst.push_str(parent);
    for component in components {
        dst.push('/');
        dst.push_str(component.trim_matches('/'));
    }

    dst
}
