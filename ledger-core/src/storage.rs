//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `accounts` - Account records with credential material (key: account_id)
//! - `entries` - Append-only entry log (key: entry_id, UUIDv7 so byte order
//!   is creation order)
//!
//! All multi-record mutations go through a single `WriteBatch`, so a
//! submission (entry + touched account balances) and a reversal (annotated
//! entry + inverse balances) commit all-or-nothing. Readers that need a
//! consistent view scan through a database snapshot.

use crate::{
    error::{Error, Result},
    types::{Account, Entry, StoredAccount},
    Config,
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use uuid::Uuid;

/// Column family names
const CF_ACCOUNTS: &str = "accounts";
const CF_ENTRIES: &str = "entries";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Self::cf_options_accounts()),
            ColumnFamilyDescriptor::new(CF_ENTRIES, Self::cf_options_entries()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db })
    }

    fn cf_options_accounts() -> Options {
        let mut opts = Options::default();
        // Accounts are read on every submission, favor decode speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_entries() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Account operations

    /// Put account record (create or update)
    pub(crate) fn put_account(&self, stored: &StoredAccount) -> Result<()> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;
        let key = stored.account.id.as_bytes();
        let value = bincode::serialize(stored)?;

        self.db.put_cf(cf, key, &value)?;

        Ok(())
    }

    /// Get account record by ID
    pub(crate) fn get_account(&self, account_id: Uuid) -> Result<StoredAccount> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;

        let value = self
            .db
            .get_cf(cf, account_id.as_bytes())?
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))?;

        let stored: StoredAccount = bincode::deserialize(&value)?;
        Ok(stored)
    }

    /// Get account record if it still exists (tombstone-aware reads)
    pub(crate) fn try_get_account(&self, account_id: Uuid) -> Result<Option<StoredAccount>> {
        match self.get_account(account_id) {
            Ok(stored) => Ok(Some(stored)),
            Err(Error::AccountNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete account record. Ledger entries referencing it are untouched;
    /// the id becomes a tombstoned reference.
    pub fn delete_account(&self, account_id: Uuid) -> Result<()> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;

        if self.db.get_cf(cf, account_id.as_bytes())?.is_none() {
            return Err(Error::AccountNotFound(account_id.to_string()));
        }

        self.db.delete_cf(cf, account_id.as_bytes())?;

        tracing::info!(account_id = %account_id, "Account deleted");

        Ok(())
    }

    /// List accounts, newest first (reverse scan over time-ordered v7 keys)
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;

        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::End) {
            let (_, value) = item?;
            let stored: StoredAccount = bincode::deserialize(&value)?;
            accounts.push(stored.account);
        }

        Ok(accounts)
    }

    // Entry operations

    /// Get entry by ID
    pub fn get_entry(&self, entry_id: Uuid) -> Result<Entry> {
        let cf = self.cf_handle(CF_ENTRIES)?;

        let value = self
            .db
            .get_cf(cf, entry_id.as_bytes())?
            .ok_or_else(|| Error::EntryNotFound(entry_id.to_string()))?;

        let entry: Entry = bincode::deserialize(&value)?;
        Ok(entry)
    }

    /// List entries, newest first
    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        let cf = self.cf_handle(CF_ENTRIES)?;

        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::End) {
            let (_, value) = item?;
            let entry: Entry = bincode::deserialize(&value)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Scan entries through a point-in-time snapshot, oldest first.
    ///
    /// The snapshot pins a consistent view: a concurrent submit or reversal
    /// is either fully visible or fully invisible, and the scan never
    /// blocks writers.
    pub fn snapshot_entries(&self) -> Result<Vec<Entry>> {
        let cf = self.cf_handle(CF_ENTRIES)?;
        let snapshot = self.db.snapshot();

        let mut entries = Vec::new();
        for item in snapshot.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            let entry: Entry = bincode::deserialize(&value)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    // Batch operations (atomic)

    /// Commit an entry together with the account records it touched.
    ///
    /// Single `WriteBatch`: either the entry and every balance land, or
    /// nothing does. Also used by reversal, where `entry` carries the
    /// `reversed` annotation and `accounts` the inverse balances.
    pub(crate) fn commit_entry(&self, entry: &Entry, accounts: &[&StoredAccount]) -> Result<()> {
        let cf_entries = self.cf_handle(CF_ENTRIES)?;
        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;

        let mut batch = WriteBatch::default();

        let entry_value = bincode::serialize(entry)?;
        batch.put_cf(cf_entries, entry.id.as_bytes(), &entry_value);

        for stored in accounts {
            let account_value = bincode::serialize(stored)?;
            batch.put_cf(cf_accounts, stored.account.id.as_bytes(), &account_value);
        }

        self.db.write(batch)?;

        tracing::debug!(
            entry_id = %entry.id,
            transaction_type = %entry.transaction_type,
            base_units = entry.base_units,
            reversed = entry.reversed,
            "Entry committed"
        );

        Ok(())
    }
}
