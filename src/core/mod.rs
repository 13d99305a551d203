pub mod composer;
pub mod loader;
pub mod scheduler;

pub use crate::domain::model::{
    DataSource, DispatchReport, FileEntry, LoadedData, RequestMethod, Row, RunSummary,
};
pub use crate::domain::ports::{Dispatcher, Storage};
pub use crate::utils::error::Result;
