//! Provider client for Veo long-running video generation operations.
//!
//! The crate wraps the Generative Language API's video lifecycle:
//!
//! - **Upload**: push a starting-frame image to the provider's Files API.
//! - **Start**: submit a generation job and get back an operation handle.
//! - **Status**: fetch the operation and normalize the provider's
//!   inconsistent response shapes into a single [`NormalizedStatus`].
//! - **Poll**: drive the status fetch either cooperatively
//!   ([`VeoClient::poll_until_done`]) or as a blocking wait under a clamped
//!   deadline ([`VeoClient::wait_for_completion`]).
//! - **Download**: resolve a [`FileReference`] into a redirect target or a
//!   byte stream.
//!
//! All job state lives with the provider; the only thing callers hold between
//! calls is the opaque operation name.
//!
//! ```ignore
//! use veoproxy_core::{GenerationRequest, VeoClient, VeoConfig};
//!
//! let client = VeoClient::new(VeoConfig::from_env());
//! let op = client.start(&GenerationRequest::with_prompt("a red fox at dawn")).await?;
//! let status = client.wait_for_completion(&op.name, None).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod request;
pub mod status;

pub use client::{Download, Operation, UploadedFile, VeoClient};
pub use config::VeoConfig;
pub use error::{Error, Result};
pub use poll::{
    clamp_wait_timeout, DEFAULT_WAIT_TIMEOUT, MAX_WAIT_TIMEOUT, MIN_WAIT_TIMEOUT, POLL_INTERVAL,
};
pub use request::{
    AspectRatio, FileReference, GenerationRequest, ModelVariant, PersonGeneration,
};
pub use status::{NormalizedStatus, OperationFailure};
