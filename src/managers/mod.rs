pub mod backup;
pub mod export;
pub mod logging;
pub mod reporting;
pub mod upload;
