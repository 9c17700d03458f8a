//! Converting [`RequestMetadata`] into typed header pairs, and inserting them into either
//! flavor of request.
use std::str::FromStr;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};

use crate::RequestMetadata;

/// Pre-converted header pairs, in the order they should be inserted.
pub type HeaderPairs<Kvp> = Arc<[(<Kvp as KeyValuePair>::Key, <Kvp as KeyValuePair>::Value)]>;

/// A trait that abstracts a key/value type together, and unifies parsing them from the
/// string metadata handed out by [`Credentials`].
///
/// [`Credentials`]: crate::Credentials
pub trait KeyValuePair: private::Sealed {
    /// The type of key
    type Key: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static;

    /// The type of value
    type Value: Clone + std::fmt::Debug + Send + Sync + 'static;

    fn parse_key(key: &str) -> crate::Result<Self::Key>;

    fn parse_value(value: &str) -> crate::Result<Self::Value>;
}

/// Trait that abstracts inserting headers into a map, for a given request type.
pub trait InsertHeaders<Kvp: KeyValuePair>: private::Sealed {
    /// Inserts, replacing any existing values under `key`.
    fn insert_header(&mut self, key: Kvp::Key, value: Kvp::Value);

    /// Appends, keeping any existing values under `key`.
    fn append_header(&mut self, key: Kvp::Key, value: Kvp::Value);

    /// Inserts every pair. The first value for a key replaces whatever the request already
    /// had, later values for the same key are appended.
    ///
    /// Keys are compared after parsing, so names that only differ in case land in the same
    /// header even when they aren't next to each other in `pairs`.
    fn insert_pairs(&mut self, pairs: &[(Kvp::Key, Kvp::Value)]) {
        let mut seen: Vec<&Kvp::Key> = Vec::with_capacity(pairs.len());

        for (key, value) in pairs {
            if seen.contains(&key) {
                self.append_header(key.clone(), value.clone());
            } else {
                self.insert_header(key.clone(), value.clone());
                seen.push(key);
            }
        }
    }
}

/// Converts metadata into header pairs, failing on the first invalid name or value.
pub fn convert<Kvp: KeyValuePair>(
    metadata: &RequestMetadata,
) -> crate::Result<HeaderPairs<Kvp>> {
    let len = metadata.values().map(Vec::len).sum::<usize>();
    let mut pairs = Vec::with_capacity(len);

    for (name, values) in metadata.iter() {
        let key = Kvp::parse_key(name)?;

        for value in values {
            pairs.push((key.clone(), Kvp::parse_value(value)?));
        }
    }

    Ok(Arc::from(pairs))
}

macro_rules! impl_insert_headers {
    ($($kvp:ty => $req:ty; $mut_fn:ident),* $(,)?) => {
        $(
            impl<Body> private::Sealed for $req { }

            impl<Body> InsertHeaders<$kvp> for $req {
                #[inline]
                fn insert_header(
                    &mut self,
                    key: <$kvp as KeyValuePair>::Key,
                    value: <$kvp as KeyValuePair>::Value,
                ) {
                    self.$mut_fn().insert(key, value);
                }

                #[inline]
                fn append_header(
                    &mut self,
                    key: <$kvp as KeyValuePair>::Key,
                    value: <$kvp as KeyValuePair>::Value,
                ) {
                    self.$mut_fn().append(key, value);
                }
            }
        )*
    };
}

impl_insert_headers! {
    Http => http::Request<Body>; headers_mut,
    Grpc => tonic::Request<Body>; metadata_mut,
}

mod private {
    pub trait Sealed {}
}

macro_rules! impl_kvp {
    ($(
        $marker:ident($inner_path:literal)=> ($key:ty, $value:ty)
    ),* $(,)?) => {
        $(
            #[doc = "Marker type used to signify the [`"]
            #[doc = $inner_path]
            #[doc = "`] flavor of headers"]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum $marker { }

            impl private::Sealed for $marker { }

            impl KeyValuePair for $marker {
                type Key = $key;
                type Value = $value;

                fn parse_key(key: &str) -> crate::Result<Self::Key> {
                    <$key as FromStr>::from_str(key).map_err(Into::into)
                }

                fn parse_value(value: &str) -> crate::Result<Self::Value> {
                    <$value as FromStr>::from_str(value).map_err(Into::into)
                }
            }
        )*
    };
}

impl_kvp! {
    Http("http::headers") => (HeaderName, HeaderValue),
    Grpc("tonic::metadata") => (AsciiMetadataKey, AsciiMetadataValue),
}
