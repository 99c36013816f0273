//! Local ABI scanner - loads interface overrides from the filesystem
//!
//! Files are named after the contract address or class hash they describe
//! (`0x04718f5a....json`) and hold either a raw ABI array or an object with
//! an `abi` field (array or JSON string, as `starknet_getClass` returns).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::domain::abi::InterfaceDefinition;
use crate::domain::Felt;

/// Interfaces found on disk, keyed by address or class hash
#[derive(Debug, Default, Clone)]
pub struct LocalAbis {
    interfaces: HashMap<Felt, InterfaceDefinition>,
    /// Number of files scanned
    pub scanned_files: usize,
    /// Scan errors
    pub errors: Vec<String>,
    /// Scan duration in milliseconds
    pub scan_ms: u128,
}

impl LocalAbis {
    pub fn get(&self, key: &Felt) -> Option<&InterfaceDefinition> {
        self.interfaces.get(key)
    }

    pub fn insert(&mut self, key: Felt, interface: InterfaceDefinition) {
        self.interfaces.insert(key, interface);
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Merge another set; entries already present win
    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        for (key, interface) in other.interfaces {
            self.interfaces.entry(key).or_insert(interface);
        }
    }
}

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root directory for ABI files
    pub fn scan(root: impl AsRef<Path>) -> LocalAbis {
        let started = Instant::now();
        let root = root.as_ref();
        let mut abis = LocalAbis::default();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    abis.errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = Self::key_from_path(path) else {
                continue;
            };

            abis.scanned_files += 1;

            match Self::load_abi_file(path) {
                Ok(interface) => abis.insert(key, interface),
                Err(err) => abis.errors.push(format!("{}: {:#}", path.display(), err)),
            }
        }

        abis.scan_ms = started.elapsed().as_millis();
        tracing::debug!(
            target: "tracelens::abi",
            root = %root.display(),
            loaded = abis.len(),
            errors = abis.errors.len(),
            "scanned local ABIs"
        );
        abis
    }

    /// Scan multiple root directories
    pub fn scan_roots(roots: &[PathBuf]) -> LocalAbis {
        let started = Instant::now();
        let mut abis = LocalAbis::default();

        for root in roots {
            abis.merge(Self::scan(root));
        }

        abis.scan_ms = started.elapsed().as_millis();
        abis
    }

    /// Load a single ABI file
    fn load_abi_file(path: &Path) -> Result<InterfaceDefinition> {
        let content = fs::read_to_string(path)?;
        let mut value: serde_json::Value =
            serde_json::from_str(&content).context("not valid JSON")?;

        if let Some(abi) = value.get_mut("abi").map(serde_json::Value::take) {
            value = abi;
        }
        InterfaceDefinition::from_json(value)
    }

    /// Address or class hash from a file stem like `0x49d3...dc7`
    fn key_from_path(path: &Path) -> Option<Felt> {
        let stem = path.file_stem()?.to_str()?;
        if !stem.starts_with("0x") && !stem.starts_with("0X") {
            return None;
        }
        stem.parse().ok()
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules"))
            .unwrap_or(false)
    }
}
