use tracing::{debug, info, warn};

use std::{io, path::Path};

use crate::{
    codec::{Codec, Decoded, Rejected},
    error::{Error, Result},
    record::{Record, Sale},
};

/// Holds the ledger's records in memory, in the order they were added.
///
/// To load an existing ledger, use [`Store::load`]. Changes are made in
/// memory only; nothing reaches disk until [`Store::persist`] (or
/// [`Store::persist_appended`]) is called.
///
/// A store remembers how many rows it couldn't read when it was loaded, and
/// [`Store::persist`] won't rewrite the ledger while that would lose them.
///
/// A `Store` has no internal locking. Callers sharing one between threads
/// must treat each change-then-persist sequence as a single critical
/// section, for example by holding a `Mutex<Store>` across both.
#[derive(Debug, Default)]
pub struct Store {
    records: Vec<Record>,
    unread: usize,
}

impl Store {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the ledger at `path`, returning the store along with any rows
    /// that couldn't be read.
    ///
    /// A missing file is not an error: it gives an empty store. Rejected
    /// rows are logged as warnings.
    ///
    /// # Errors
    ///
    /// Returns any errors from opening or reading the file, other than its
    /// not existing.
    pub fn load(path: impl AsRef<Path>, codec: &Codec) -> Result<(Self, Vec<Rejected>)> {
        let path = path.as_ref();
        let Decoded { records, rejected } = match codec.read_path(path) {
            Ok(decoded) => decoded,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no ledger yet, starting empty");
                Decoded::default()
            }
            Err(e) => return Err(e),
        };
        for r in &rejected {
            warn!(path = %path.display(), line = r.line, "skipping row: {}", r.error);
        }
        let store = Self {
            records,
            unread: rejected.len(),
        };
        Ok((store, rejected))
    }

    /// Adds `record` to the end of the store.
    pub fn append(&mut self, record: Record) {
        info!(id = %record.id(), "adding sale");
        self.records.push(record);
    }

    /// Returns the first record with ID `id`, if any.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Replaces the details of the first record with ID `id`, keeping its ID
    /// and position. Returns `false` if there is no such record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeValue`] if `sale` has a negative price; the
    /// record is then left as it was.
    pub fn update(&mut self, id: &str, sale: Sale) -> Result<bool> {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            return Ok(false);
        };
        record.replace(sale)?;
        info!(id, "updated sale");
        Ok(true)
    }

    /// Removes every record with ID `id`, returning `false` if there were
    /// none.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_ledger::Store;
    /// let mut store = Store::new();
    /// assert!(!store.delete("SID1000"));
    /// ```
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = before - self.records.len();
        if removed > 0 {
            info!(id, removed, "deleted sale");
        }
        removed > 0
    }

    /// Like [`Store::update`], but a missing ID is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdNotFound`] if there is no record with ID `id`.
    pub fn update_or_err(&mut self, id: &str, sale: Sale) -> Result<()> {
        if self.update(id, sale)? {
            Ok(())
        } else {
            Err(Error::IdNotFound(id.to_string()))
        }
    }

    /// Like [`Store::delete`], but a missing ID is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdNotFound`] if there is no record with ID `id`.
    pub fn delete_or_err(&mut self, id: &str) -> Result<()> {
        if self.delete(id) {
            Ok(())
        } else {
            Err(Error::IdNotFound(id.to_string()))
        }
    }

    /// Writes every record to `path`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreadRows`], without writing anything, if some rows
    /// couldn't be read when the store was loaded, since rewriting would
    /// drop them. Otherwise returns any errors from [`Codec::write_path`].
    /// The store itself is unchanged either way.
    pub fn persist(&self, path: impl AsRef<Path>, codec: &Codec) -> Result<()> {
        if self.unread > 0 {
            return Err(Error::UnreadRows { count: self.unread });
        }
        codec.write_path(path, &self.records)
    }

    /// Like [`Store::persist`], but writes even if that drops rows that
    /// couldn't be read.
    ///
    /// # Errors
    ///
    /// Returns any errors from [`Codec::write_path`].
    pub fn persist_dropping_unread(&mut self, path: impl AsRef<Path>, codec: &Codec) -> Result<()> {
        codec.write_path(path, &self.records)?;
        if self.unread > 0 {
            warn!(dropped = self.unread, "rewrote ledger without unreadable rows");
            self.unread = 0;
        }
        Ok(())
    }

    /// How many rows couldn't be read when the store was loaded.
    #[must_use]
    pub fn unread(&self) -> usize {
        self.unread
    }

    /// Appends the records from position `from` onwards to `path`, leaving
    /// the rows already there alone.
    ///
    /// This suits a store that has only had records appended since it was
    /// loaded from `path`, with `from` being its length at load time.
    ///
    /// # Errors
    ///
    /// Returns any errors from [`Codec::append_path`].
    pub fn persist_appended(
        &self,
        path: impl AsRef<Path>,
        codec: &Codec,
        from: usize,
    ) -> Result<()> {
        let new = self.records.get(from..).unwrap_or_default();
        codec.append_path(path, new)
    }

    /// The records, in the order they were added.
    #[must_use]
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for Store {
    fn from(records: Vec<Record>) -> Self {
        Self { records, unread: 0 }
    }
}
