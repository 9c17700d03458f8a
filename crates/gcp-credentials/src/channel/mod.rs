//! [`CredentialsChannel`], a [`Service`] that inserts credential metadata into each request.
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Request;
use tonic::transport::Channel;
use tonic::{Status, service::Interceptor};
use tower::{Layer, Service};

use crate::{Credentials, Error};

mod future;
pub mod headers;

pub use future::CredentialsFuture;
use headers::{Grpc, HeaderPairs, Http, InsertHeaders};

/// A bare channel, with every request carrying the metadata supplied by the inner
/// [`Credentials`].
#[derive(Debug, Clone)]
pub struct CredentialsChannel<Svc = Channel> {
    svc: Svc,
    credentials: Arc<dyn Credentials>,
    cached: Option<HeaderPairs<Http>>,
}

/// Converts the metadata up front if the credentials say it never depends on the request.
fn cache_if_static<Kvp: headers::KeyValuePair>(
    credentials: &dyn Credentials,
) -> crate::Result<Option<HeaderPairs<Kvp>>> {
    if !credentials.has_request_metadata() {
        return Ok(Some(Arc::from([])));
    }

    if !credentials.has_request_metadata_only() {
        return Ok(None);
    }

    let metadata = credentials.request_metadata(None)?;
    headers::convert::<Kvp>(&metadata).map(Some)
}

impl<Svc> CredentialsChannel<Svc> {
    /// Wraps `svc`. Fails if the credentials hand out metadata that isn't a valid header.
    pub fn new(svc: Svc, credentials: Arc<dyn Credentials>) -> crate::Result<Self> {
        let cached = cache_if_static::<Http>(&*credentials)?;

        tracing::debug!(
            message = "built credentials channel",
            auth_type = credentials.authentication_type(),
            static_headers = cached.as_ref().map(|pairs| pairs.len()),
        );

        Ok(Self {
            svc,
            credentials,
            cached,
        })
    }

    pub fn credentials(&self) -> &Arc<dyn Credentials> {
        &self.credentials
    }

    #[inline]
    pub fn into_service(self) -> Svc {
        self.svc
    }

    #[inline]
    pub fn service(&self) -> &Svc {
        &self.svc
    }

    #[inline]
    pub fn service_mut(&mut self) -> &mut Svc {
        &mut self.svc
    }

    /// Applys a [`Layer`] to the inner `Svc`, keeping the same credentials.
    #[inline]
    pub fn apply_layer<L>(self, layer: L) -> CredentialsChannel<L::Service>
    where
        L: Layer<Svc>,
    {
        CredentialsChannel {
            svc: layer.layer(self.svc),
            credentials: self.credentials,
            cached: self.cached,
        }
    }

    fn insert_metadata<Body>(&self, req: &mut Request<Body>) -> crate::Result<()> {
        match self.cached {
            Some(ref pairs) => InsertHeaders::<Http>::insert_pairs(req, pairs),
            None => {
                let metadata = self.credentials.request_metadata(Some(req.uri()))?;
                let pairs = headers::convert::<Http>(&metadata)?;
                InsertHeaders::<Http>::insert_pairs(req, &pairs);
            }
        }

        Ok(())
    }
}

impl<Svc: Clone> CredentialsChannel<Svc> {
    /// This function is to get around the normal clone behavior, in order to avoid the panic
    /// caused by tonic using a tower buffer internally.
    ///
    /// See https://github.com/tower-rs/tower/issues/547#issuecomment-767629149 for details
    fn take_ready(&mut self) -> Svc {
        let clone = self.svc.clone();
        std::mem::replace(&mut self.svc, clone)
    }
}

impl<Svc, Body> Service<Request<Body>> for CredentialsChannel<Svc>
where
    Svc: Service<Request<Body>> + Clone,
    Svc::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = Svc::Response;
    type Error = Error;
    type Future = CredentialsFuture<Svc::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Service::poll_ready(&mut self.svc, cx).map_err(|e| Error::Transport(e.into()))
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        if let Err(error) = self.insert_metadata(&mut req) {
            tracing::warn!(message = "failed to attach credential metadata", ?error);
            return CredentialsFuture::failed(error);
        }

        // see docs on `take_ready` as to why this is needed
        let mut svc = self.take_ready();
        CredentialsFuture::calling(svc.call(req))
    }
}

/// The [`Layer`] counterpart to [`CredentialsChannel`].
#[derive(Debug, Clone)]
pub struct CredentialsLayer {
    credentials: Arc<dyn Credentials>,
    cached: Option<HeaderPairs<Http>>,
}

impl CredentialsLayer {
    pub fn new(credentials: Arc<dyn Credentials>) -> crate::Result<Self> {
        let cached = cache_if_static::<Http>(&*credentials)?;
        Ok(Self {
            credentials,
            cached,
        })
    }
}

impl<S> Layer<S> for CredentialsLayer {
    type Service = CredentialsChannel<S>;

    fn layer(&self, svc: S) -> Self::Service {
        CredentialsChannel {
            svc,
            credentials: Arc::clone(&self.credentials),
            cached: self.cached.clone(),
        }
    }
}

/// Inserts credential metadata via a tonic [`Interceptor`], for use with generated
/// clients' `with_interceptor` constructors.
#[derive(Debug, Clone)]
pub struct CredentialsInterceptor {
    credentials: Arc<dyn Credentials>,
    cached: Option<HeaderPairs<Grpc>>,
}

impl CredentialsInterceptor {
    pub fn new(credentials: Arc<dyn Credentials>) -> crate::Result<Self> {
        let cached = cache_if_static::<Grpc>(&*credentials)?;
        Ok(Self {
            credentials,
            cached,
        })
    }
}

impl Interceptor for CredentialsInterceptor {
    fn call(&mut self, mut request: tonic::Request<()>) -> Result<tonic::Request<()>, Status> {
        match self.cached {
            Some(ref pairs) => InsertHeaders::<Grpc>::insert_pairs(&mut request, pairs),
            None => {
                let pairs = self
                    .credentials
                    .request_metadata(None)
                    .and_then(|metadata| headers::convert::<Grpc>(&metadata))
                    .map_err(|error| Status::unauthenticated(error.to_string()))?;

                InsertHeaders::<Grpc>::insert_pairs(&mut request, &pairs);
            }
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::{HeaderMap, Response};
    use tower::ServiceExt;

    use super::*;
    use crate::{EmulatorCredentials, RequestMetadata};

    const PREFIX: &str = "projects/proj1/databases/(default)";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn echo_headers()
    -> impl Service<Request<()>, Response = Response<HeaderMap>, Error = Infallible> + Clone {
        tower::service_fn(|req: Request<()>| async move {
            Ok::<_, Infallible>(Response::new(req.headers().clone()))
        })
    }

    #[tokio::test]
    async fn test_emulator_headers_inserted() {
        init_tracing();
        let creds: Arc<dyn Credentials> = Arc::new(EmulatorCredentials::new(PREFIX));
        let channel = CredentialsChannel::new(echo_headers(), creds).unwrap();

        for path in ["/a", "/b/c"] {
            let req = Request::builder().uri(path).body(()).unwrap();
            let headers = channel.clone().oneshot(req).await.unwrap().into_body();

            assert_eq!(headers.len(), 2);
            assert_eq!(headers["authorization"], "Bearer owner");
            assert_eq!(headers["google-cloud-resource-prefix"], PREFIX);
        }
    }

    /// Credentials whose metadata depends on the request, so nothing can be cached.
    #[derive(Debug, Default)]
    struct PerRequest {
        calls: AtomicUsize,
    }

    impl Credentials for PerRequest {
        fn authentication_type(&self) -> Option<&str> {
            Some("test")
        }

        fn request_metadata(&self, uri: Option<&http::Uri>) -> crate::Result<RequestMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let path = uri.map(|uri| uri.path().to_owned()).unwrap_or_default();
            if path == "/forbidden" {
                return Err(Error::Refresh("no credentials for this path".to_owned()));
            }

            let mut map = BTreeMap::new();
            map.insert("x-path".to_owned(), vec![path]);
            Ok(Arc::new(map))
        }

        fn has_request_metadata(&self) -> bool {
            true
        }

        fn has_request_metadata_only(&self) -> bool {
            false
        }

        fn refresh(&self) -> crate::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_per_request_metadata() {
        init_tracing();
        let creds = Arc::new(PerRequest::default());
        let channel = CredentialsChannel::new(echo_headers(), creds.clone()).unwrap();

        let req = Request::builder().uri("/first").body(()).unwrap();
        let headers = channel.clone().oneshot(req).await.unwrap().into_body();
        assert_eq!(headers["x-path"], "/first");

        let req = Request::builder().uri("/second").body(()).unwrap();
        let headers = channel.oneshot(req).await.unwrap().into_body();
        assert_eq!(headers["x-path"], "/second");

        assert_eq!(creds.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_per_request_metadata_error() {
        init_tracing();

        let creds = Arc::new(PerRequest::default());
        let channel = CredentialsChannel::new(echo_headers(), creds.clone()).unwrap();

        let req = Request::builder().uri("/forbidden").body(()).unwrap();
        let result = channel.clone().oneshot(req).await;
        assert!(matches!(result, Err(Error::Refresh(_))));

        // the channel is still usable afterwards
        let req = Request::builder().uri("/allowed").body(()).unwrap();
        let headers = channel.oneshot(req).await.unwrap().into_body();
        assert_eq!(headers["x-path"], "/allowed");

        assert_eq!(creds.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inner_service_error() {
        init_tracing();

        let failing = tower::service_fn(|_req: Request<()>| async move {
            Err::<Response<()>, _>(std::io::Error::other("connection refused"))
        });

        let creds: Arc<dyn Credentials> = Arc::new(EmulatorCredentials::new(PREFIX));
        let channel = CredentialsChannel::new(failing, creds).unwrap();

        let req = Request::builder().uri("/").body(()).unwrap();
        match channel.oneshot(req).await {
            Err(Error::Transport(error)) => assert_eq!(error.to_string(), "connection refused"),
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_interceptor_metadata_error() {
        let creds = Arc::new(Failing);
        let mut interceptor = CredentialsInterceptor::new(creds).unwrap();

        let status = interceptor.call(tonic::Request::new(())).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    /// Credentials that never produce metadata.
    #[derive(Debug)]
    struct Failing;

    impl Credentials for Failing {
        fn authentication_type(&self) -> Option<&str> {
            None
        }

        fn request_metadata(&self, _uri: Option<&http::Uri>) -> crate::Result<RequestMetadata> {
            Err(Error::Refresh("expired".to_owned()))
        }

        fn has_request_metadata(&self) -> bool {
            true
        }

        fn has_request_metadata_only(&self) -> bool {
            false
        }

        fn refresh(&self) -> crate::Result<()> {
            Err(Error::Refresh("expired".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_layer() {
        let creds: Arc<dyn Credentials> = Arc::new(EmulatorCredentials::new(PREFIX));
        let layer = CredentialsLayer::new(creds).unwrap();
        let channel = layer.layer(echo_headers());

        let req = Request::builder().uri("/").body(()).unwrap();
        let headers = channel.oneshot(req).await.unwrap().into_body();
        assert_eq!(headers["authorization"], "Bearer owner");
    }

    #[test]
    fn test_interceptor() {
        let creds: Arc<dyn Credentials> = Arc::new(EmulatorCredentials::new(PREFIX));
        let mut interceptor = CredentialsInterceptor::new(creds).unwrap();

        let req = interceptor.call(tonic::Request::new(())).unwrap();
        let meta = req.metadata();

        assert_eq!(meta.get("authorization").unwrap().to_str().unwrap(), "Bearer owner");
        assert_eq!(
            meta.get("google-cloud-resource-prefix").unwrap().to_str().unwrap(),
            PREFIX
        );
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let creds: Arc<dyn Credentials> = Arc::new(EmulatorCredentials::new("bad\nprefix"));
        let result = CredentialsChannel::new(echo_headers(), creds);
        assert!(matches!(result, Err(Error::InvalidHeaderValue(_))));
    }
}
