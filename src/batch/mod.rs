mod collect;
mod dispatcher;

pub use collect::collect_descriptors;
pub use dispatcher::{BatchReport, Dispatcher, FileOutcome, unpack};
