//! RocksDB-backed process store
//!
//! # Column Families
//!
//! - `negotiations` - negotiation records (key: consumerPid|providerPid)
//! - `transfers` - transfer records (key: consumerPid|providerPid)
//! - `agreements` - agreement id -> negotiation key index
//!
//! Records are stored as JSON documents. Compare-and-swap holds a per-key
//! entry lock for the read-modify-write; reads go straight to RocksDB
//! without locking.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::ProcessStore;
use crate::types::{NegotiationProcess, ProcessId, TransferProcess};
use dashmap::DashMap;
use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, Options, WriteBatch, DB};
use std::sync::Arc;
use tracing::{debug, info};

/// Column family names
const CF_NEGOTIATIONS: &str = "negotiations";
const CF_TRANSFERS: &str = "transfers";
const CF_AGREEMENTS: &str = "agreements";

/// Durable store backed by RocksDB
pub struct RocksStore {
    db: Arc<DB>,
    // per-key guards serializing compare-and-swap sections
    write_locks: DashMap<Vec<u8>, ()>,
}

impl RocksStore {
    /// Open or create the database
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = &config.data_dir;
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_NEGOTIATIONS, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_TRANSFERS, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_AGREEMENTS, Self::cf_options()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        info!("Opened process store at {:?}", path);

        Ok(Self {
            db: Arc::new(db),
            write_locks: DashMap::new(),
        })
    }

    fn cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_handle(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Storage(format!("Column family {} not found", name)))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf_handle(cf)?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl ProcessStore for RocksStore {
    fn insert_negotiation(&self, record: &NegotiationProcess) -> Result<()> {
        let key = record.process_id.storage_key();
        let _guard = self.write_locks.entry(key.clone()).or_insert(());

        let cf = self.cf_handle(CF_NEGOTIATIONS)?;
        if self.db.get_cf(&cf, &key)?.is_some() {
            return Err(StoreError::Conflict(record.process_id.to_string()));
        }

        let value = serde_json::to_vec(record)?;
        self.db.put_cf(&cf, &key, value)?;

        debug!(process = %record.process_id, "negotiation record created");
        Ok(())
    }

    fn update_negotiation(
        &self,
        record: &NegotiationProcess,
        expected_version: u64,
    ) -> Result<()> {
        let key = record.process_id.storage_key();
        let _guard = self.write_locks.entry(key.clone()).or_insert(());

        let current: NegotiationProcess = self
            .read(CF_NEGOTIATIONS, &key)?
            .ok_or_else(|| StoreError::Conflict(record.process_id.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::Conflict(record.process_id.to_string()));
        }

        // Record plus agreement index entry commit atomically
        let mut batch = WriteBatch::default();
        let cf = self.cf_handle(CF_NEGOTIATIONS)?;
        batch.put_cf(&cf, &key, serde_json::to_vec(record)?);

        if let Some(agreement) = &record.agreement {
            let cf_agreements = self.cf_handle(CF_AGREEMENTS)?;
            batch.put_cf(&cf_agreements, agreement.id.as_bytes(), &key);
        }

        self.db.write(batch)?;

        debug!(process = %record.process_id, version = record.version, "negotiation record updated");
        Ok(())
    }

    fn get_negotiation(&self, id: &ProcessId) -> Result<Option<NegotiationProcess>> {
        self.read(CF_NEGOTIATIONS, &id.storage_key())
    }

    fn insert_transfer(&self, record: &TransferProcess) -> Result<()> {
        let key = record.process_id.storage_key();
        let _guard = self.write_locks.entry(key.clone()).or_insert(());

        let cf = self.cf_handle(CF_TRANSFERS)?;
        if self.db.get_cf(&cf, &key)?.is_some() {
            return Err(StoreError::Conflict(record.process_id.to_string()));
        }

        self.db.put_cf(&cf, &key, serde_json::to_vec(record)?)?;

        debug!(process = %record.process_id, "transfer record created");
        Ok(())
    }

    fn update_transfer(&self, record: &TransferProcess, expected_version: u64) -> Result<()> {
        let key = record.process_id.storage_key();
        let _guard = self.write_locks.entry(key.clone()).or_insert(());

        let current: TransferProcess = self
            .read(CF_TRANSFERS, &key)?
            .ok_or_else(|| StoreError::Conflict(record.process_id.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::Conflict(record.process_id.to_string()));
        }

        let cf = self.cf_handle(CF_TRANSFERS)?;
        self.db.put_cf(&cf, &key, serde_json::to_vec(record)?)?;

        debug!(process = %record.process_id, version = record.version, "transfer record updated");
        Ok(())
    }

    fn get_transfer(&self, id: &ProcessId) -> Result<Option<TransferProcess>> {
        self.read(CF_TRANSFERS, &id.storage_key())
    }

    fn find_agreement(&self, agreement_id: &str) -> Result<Option<NegotiationProcess>> {
        let cf = self.cf_handle(CF_AGREEMENTS)?;
        let Some(key) = self.db.get_cf(&cf, agreement_id.as_bytes())? else {
            return Ok(None);
        };
        self.read(CF_NEGOTIATIONS, &key)
    }
}
