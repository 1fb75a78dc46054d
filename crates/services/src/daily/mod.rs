//! Daily question bundles: cache-first orchestration over the mix allocator
//! and the pool sampler.

mod activity;
mod service;

pub use activity::{DAILY_SELECTION_EVENT, selection_record};
pub use service::DailyQuestionService;
