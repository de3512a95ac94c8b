//! Tables: a record file plus an optional B+-tree index on the key.
//!
//! A table named `movie` in directory `dir` lives in `dir/movie.tbl`, with
//! its index (if loaded with one) in `dir/movie.idx`.

mod condition;
mod load_line;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::common::Result;
use crate::index::{BTreeIndex, OpenMode};
use crate::record::{check_value, RecordFile};

pub use condition::{plan, Comparison, Condition, ScanPlan};
pub use load_line::parse_load_line;

/// One row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub key: i32,
    pub value: String,
}

/// Handle to a table's files. Opening happens per operation.
#[derive(Debug, Clone)]
pub struct Table {
    dir: PathBuf,
    name: String,
}

impl Table {
    pub fn new<P: AsRef<Path>>(dir: P, name: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            name: name.to_string(),
        }
    }

    pub fn table_path(&self) -> PathBuf {
        self.dir.join(format!("{}.tbl", self.name))
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(format!("{}.idx", self.name))
    }

    pub fn has_index(&self) -> bool {
        self.index_path().exists()
    }

    /// Append every line of `reader` to the table, indexing the keys when
    /// `with_index` is set. Returns the number of tuples loaded.
    ///
    /// Values are checked and keys are inserted into the index before the
    /// tuple is stored, so an oversized value or a duplicate key stops the
    /// load with nothing written for that line.
    ///
    /// # Errors
    /// - `Error::InvalidLoadLine` for a line without a comma
    /// - `Error::ValueTooLong` for a value that does not fit a record slot
    /// - `Error::DuplicateKey` for a key the index already holds
    pub fn load<R: BufRead>(&self, reader: R, with_index: bool) -> Result<usize> {
        let mut records = RecordFile::open(self.table_path(), OpenMode::Write)?;
        let mut index = if with_index {
            Some(BTreeIndex::open(self.index_path(), OpenMode::Write)?)
        } else {
            None
        };

        let mut loaded = 0;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = parse_load_line(&line)?;
            check_value(&value)?;
            if let Some(index) = index.as_mut() {
                index.insert(key, records.end_record_id())?;
            }
            records.append(key, &value)?;
            loaded += 1;
        }

        if let Some(index) = index {
            index.close()?;
        }
        records.close()?;
        info!(table = %self.name, loaded, indexed = with_index, "loaded table");
        Ok(loaded)
    }

    /// The scan strategy `select` would use for `conditions`.
    pub fn plan(&self, conditions: &[Condition]) -> ScanPlan {
        plan(conditions, self.has_index())
    }

    /// All tuples satisfying every condition.
    ///
    /// Index scans return tuples in key order; full scans in load order.
    pub fn select(&self, conditions: &[Condition]) -> Result<Vec<Tuple>> {
        let mut records = RecordFile::open(self.table_path(), OpenMode::Read)?;
        let matches = |t: &Tuple| conditions.iter().all(|c| c.matches(t.key, &t.value));

        let plan = self.plan(conditions);
        debug!(table = %self.name, ?plan, "select");

        let mut tuples = Vec::new();
        match plan {
            ScanPlan::NoMatch => {}
            ScanPlan::IndexRange { lower, upper } => {
                let mut index = BTreeIndex::open(self.index_path(), OpenMode::Read)?;
                for entry in index.range(lower, upper)? {
                    let (_, rid) = entry?;
                    let tuple = Tuple::from(records.read(rid)?);
                    if matches(&tuple) {
                        tuples.push(tuple);
                    }
                }
            }
            ScanPlan::FullScan => {
                for record in records.scan() {
                    let (_, key, value) = record?;
                    let tuple = Tuple::from((key, value));
                    if matches(&tuple) {
                        tuples.push(tuple);
                    }
                }
            }
        }
        Ok(tuples)
    }

    /// Number of tuples satisfying every condition.
    pub fn count(&self, conditions: &[Condition]) -> Result<usize> {
        self.select(conditions).map(|tuples| tuples.len())
    }
}

impl From<(i32, String)> for Tuple {
    fn from((key, value): (i32, String)) -> Self {
        Tuple { key, value }
    }
}
