//! Wires Firestore clients up to a local emulator.
//!
//! [`configure`] is the entry point: given a [`FirestoreEmulatorConfig`], it either builds
//! nothing (emulator disabled), or builds [`FirestoreOptions`] pointing at the emulator over
//! plaintext, plus (with the `template` feature) a [`FirestoreStub`] and
//! [`FirestoreTemplate`] that share the same [`EmulatorCredentials`].
//!
//! [`EmulatorCredentials`]: gcp_credentials::EmulatorCredentials

pub mod channel;
pub mod config;
pub mod configurator;
mod error;
pub mod options;
pub mod path;
#[cfg(feature = "template")]
pub mod stub;
#[cfg(feature = "template")]
pub mod template;

pub use channel::ChannelOptions;
pub use config::FirestoreEmulatorConfig;
pub use configurator::{EmulatorComponents, EmulatorConfigurator, configure};
pub use error::{ConfigError, Error};
pub use options::FirestoreOptions;
#[cfg(feature = "template")]
pub use stub::FirestoreStub;
#[cfg(feature = "template")]
pub use template::FirestoreTemplate;

pub type Result<T> = core::result::Result<T, Error>;
