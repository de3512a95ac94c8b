//! Record store - the tuples an index points into.

mod record_file;

pub use record_file::{check_value, RecordFile, RecordScan, MAX_VALUE_LEN, RECORDS_PER_PAGE};
