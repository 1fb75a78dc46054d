#![forbid(unsafe_code)]

pub mod error;
pub mod mix;
pub mod model;
pub mod sampler;
pub mod time;

pub use error::Error;
pub use mix::{MixError, compute_mix};
pub use sampler::{Candidate, Selection, select_questions};
pub use time::Clock;
