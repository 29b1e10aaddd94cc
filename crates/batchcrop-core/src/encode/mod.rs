//! Fixed-format output encoding.
//!
//! Every rendered crop leaves the pipeline as JPEG. The quality setting is
//! chosen once by the caller and applied uniformly, so all entries of an
//! exported batch match.

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError};
