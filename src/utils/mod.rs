pub mod destination;
pub mod timer;

pub use destination::BackupDestination;
pub use timer::timed;
