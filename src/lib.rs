pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::http::{ApiSettings, AuthScheme, Credentials, HttpDispatcher};
pub use config::{cli::LocalStorage, AppConfig, Settings};
pub use core::{
    composer::{compose, Template, PLACEHOLDER},
    loader::DataLoader,
    scheduler::{DeliveryPlan, PushMode, SchedulePlan, Scheduler, SchedulerState},
};
pub use utils::error::{PushError, Result};
