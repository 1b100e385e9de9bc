//! Wire-level types shared by the transport and the request executor.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestSpec`] | Method, path, query and JSON payload of one logical call |
//! | [`HttpMethod`] | Supported HTTP verbs |
//! | [`ResponseEnvelope`] | `{success, data?, error?}` document interpretation |
//! | [`ErrorBody`] | `{message, code?}` error descriptor |

pub mod envelope;
pub mod request;

pub use envelope::{ErrorBody, ResponseEnvelope};
pub use request::{HttpMethod, RequestSpec};
