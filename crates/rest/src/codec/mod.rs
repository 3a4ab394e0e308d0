//! Wire-level codecs for header values.

pub mod rfc2047;
