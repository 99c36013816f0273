use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::domain::Felt;

/// Human-friendly metadata for an address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLabel {
    /// `0x` + 64 hex digits
    pub address: String,
    pub address_name: Option<String>,
    pub label_name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u32>,
    pub image_url: Option<String>,
}

impl AddressLabel {
    pub fn new(address: &Felt) -> Self {
        Self {
            address: address.to_fixed_hex(),
            ..Self::default()
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            address: row.get(0)?,
            address_name: row.get(1)?,
            label_name: row.get(2)?,
            symbol: row.get(3)?,
            decimals: row.get(4)?,
            image_url: row.get(5)?,
        })
    }
}

#[derive(Debug)]
pub struct LabelStore {
    conn: Connection,
}

impl LabelStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn load_all(&self) -> Result<Vec<AddressLabel>> {
        let mut stmt = self.conn.prepare(
            "SELECT address, address_name, label_name, symbol, decimals, image_url
             FROM addresses ORDER BY address",
        )?;
        let labels = stmt
            .query_map([], AddressLabel::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(labels)
    }

    pub fn get(&self, address: &Felt) -> Result<Option<AddressLabel>> {
        let label = self
            .conn
            .query_row(
                "SELECT address, address_name, label_name, symbol, decimals, image_url
                 FROM addresses WHERE address = ?1",
                params![address.to_fixed_hex()],
                AddressLabel::from_row,
            )
            .optional()?;
        Ok(label)
    }

    pub fn set(&self, label: &AddressLabel) -> Result<()> {
        self.conn.execute(
            "INSERT INTO addresses(address, address_name, label_name, symbol, decimals, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(address) DO UPDATE SET
                address_name=excluded.address_name,
                label_name=excluded.label_name,
                symbol=excluded.symbol,
                decimals=excluded.decimals,
                image_url=excluded.image_url",
            params![
                label.address,
                label.address_name,
                label.label_name,
                label.symbol,
                label.decimals,
                label.image_url
            ],
        )?;
        Ok(())
    }

    pub fn remove(&self, address: &Felt) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM addresses WHERE address = ?1",
            params![address.to_fixed_hex()],
        )?;
        Ok(removed > 0)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS addresses (
                address      TEXT PRIMARY KEY,
                address_name TEXT,
                label_name   TEXT,
                symbol       TEXT,
                decimals     INTEGER,
                image_url    TEXT
            );",
        )?;
        Ok(())
    }
}
