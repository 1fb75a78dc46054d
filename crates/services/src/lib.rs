#![forbid(unsafe_code)]

pub mod app_services;
pub mod daily;
pub mod error;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use daily::{DAILY_SELECTION_EVENT, DailyQuestionService};
pub use error::{AppServicesError, DailyQuestionsError};
