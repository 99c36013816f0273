//! Persistent cache for class ABIs
//!
//! Class hashes are content addresses, so a cached ABI never goes stale.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::domain::abi::InterfaceDefinition;
use crate::domain::Felt;

/// SQLite-backed class ABI cache
#[derive(Debug)]
pub struct AbiCache {
    conn: Connection,
}

impl AbiCache {
    /// Open or create the cache database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        let cache = Self { conn };
        cache.init()?;
        Ok(cache)
    }

    /// Cache that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.init()?;
        Ok(cache)
    }

    /// Initialize database schema
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS class_abis (
                class_hash  TEXT PRIMARY KEY,
                abi_json    TEXT NOT NULL,
                created_at  INTEGER DEFAULT (strftime('%s', 'now'))
            );
            ",
        )?;
        Ok(())
    }

    /// Save the interface of a class
    pub fn save_abi(&self, class_hash: &Felt, interface: &InterfaceDefinition) -> Result<()> {
        let abi_json = serde_json::to_string(interface)?;
        self.conn.execute(
            "INSERT INTO class_abis(class_hash, abi_json) VALUES (?1, ?2)
             ON CONFLICT(class_hash) DO UPDATE SET abi_json=excluded.abi_json",
            params![class_hash.to_fixed_hex(), abi_json],
        )?;
        Ok(())
    }

    /// Get the cached interface of a class
    pub fn get_abi(&self, class_hash: &Felt) -> Result<Option<InterfaceDefinition>> {
        let mut stmt = self
            .conn
            .prepare("SELECT abi_json FROM class_abis WHERE class_hash = ?1")?;

        let mut rows = stmt.query(params![class_hash.to_fixed_hex()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let abi_json: String = row.get(0)?;
        let value = serde_json::from_str(&abi_json).context("corrupt cached ABI")?;
        InterfaceDefinition::from_json(value).map(Some)
    }

    /// Number of cached classes
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM class_abis", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Drop every cached ABI
    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM class_abis", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_get() {
        let cache = AbiCache::open_in_memory().unwrap();
        let class_hash: Felt = "0x0abc".parse().unwrap();
        let interface = InterfaceDefinition::from_json(json!([
            {"type": "function", "name": "transfer", "inputs": [
                {"name": "amount", "type": "core::integer::u256"}
            ], "outputs": [], "state_mutability": "external"},
            {"type": "event", "name": "Transfer", "kind": "struct", "members": []}
        ]))
        .unwrap();

        assert!(cache.get_abi(&class_hash).unwrap().is_none());
        cache.save_abi(&class_hash, &interface).unwrap();
        cache.save_abi(&class_hash, &interface).unwrap();

        let cached = cache.get_abi(&"0xabc".parse().unwrap()).unwrap().unwrap();
        assert_eq!(cached, interface);
        assert_eq!(cache.len().unwrap(), 1);
        assert_eq!(cache.clear().unwrap(), 1);
    }
}
