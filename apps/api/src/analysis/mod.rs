// Results pipeline: Submission Builder → Analysis Client → Result Normalizer
// → (view | Exporter). Only `client` performs network I/O.

pub mod client;
pub mod export;
pub mod guard;
pub mod handlers;
pub mod normalizer;
pub mod submission;
