//! URL handling module
//!
//! The crawler only needs one thing from a URL: the host it belongs to, which
//! keys the per-host download throttle. Anything that is not an absolute URL
//! with a host is rejected as malformed.

mod host;

pub use host::{get_host, host_of};
