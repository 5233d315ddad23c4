#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod controller;
pub mod course;
pub mod error;
pub mod gateway;
pub mod timer;

pub use lms_core::Clock;

pub use api::{HttpBackend, InMemoryBackend, LmsBackend, ScriptedSubmit};
pub use config::ApiConfig;
pub use controller::SessionController;
pub use course::{CourseService, LessonRefresh};
pub use error::{ApiError, ConfigError};
pub use gateway::SubmissionGateway;
pub use timer::{SessionTimer, TimerSignal};
