use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;

use crate::Error;

pin_project! {
    /// Future returned by [`CredentialsChannel`].
    ///
    /// [`CredentialsChannel`]: super::CredentialsChannel
    #[project = CredentialsFutureProj]
    pub enum CredentialsFuture<F> {
        Failed { error: Option<Error> },
        Calling {
            #[pin]
            future: F,
        },
    }
}

impl<F> CredentialsFuture<F> {
    pub(super) fn failed(error: Error) -> Self {
        Self::Failed { error: Some(error) }
    }

    pub(super) fn calling(future: F) -> Self {
        Self::Calling { future }
    }
}

impl<F, T, E> Future for CredentialsFuture<F>
where
    F: Future<Output = Result<T, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            CredentialsFutureProj::Failed { error } => match error.take() {
                Some(error) => Poll::Ready(Err(error)),
                None => panic!("CredentialsFuture polled after completion"),
            },
            CredentialsFutureProj::Calling { future } => {
                future.poll(cx).map_err(|e| Error::Transport(e.into()))
            }
        }
    }
}
