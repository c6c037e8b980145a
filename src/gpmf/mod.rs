//! GPMF telemetry container reading.
//!
//! GoPro cameras interleave sensor telemetry into the recording as a
//! metadata track of GPMF payloads. `stream` and `klv` handle the byte-level
//! structure; `extract` resolves a named sensor stream into index-aligned
//! samples and device-relative timestamps.

pub mod extract;
pub mod klv;
pub mod stream;

pub use extract::*;
pub use klv::*;
pub use stream::*;
