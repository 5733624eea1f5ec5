use crate::error::RegistryError;
use crate::registry::{BlockRegistry, BlockSpec, Slot, SlotKind};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn load_block_table(path: &Path, registry: &mut BlockRegistry) -> Result<usize> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read block table '{}'.", path.display()))?;
    let specs = parse_block_table(&text)
        .with_context(|| format!("Invalid block table '{}'.", path.display()))?;
    let count = specs.len();
    register_all(registry, specs)?;
    tracing::debug!(path = %path.display(), count, "loaded block table");
    Ok(count)
}

/// Registers every spec or none of them.
pub fn register_all(registry: &mut BlockRegistry, specs: Vec<BlockSpec>) -> Result<(), RegistryError> {
    {
        let mut incoming = HashSet::new();
        for spec in &specs {
            if registry.get(spec.id()).is_some() || !incoming.insert(spec.id()) {
                return Err(RegistryError::DuplicateBlock(spec.id().to_string()));
            }
        }
    }
    for spec in specs {
        registry.register(spec)?;
    }
    Ok(())
}

pub fn parse_block_table(text: &str) -> Result<Vec<BlockSpec>> {
    let doc: Value = serde_json::from_str(text).context("Block table is not valid JSON.")?;
    let blocks = doc
        .get("blocks")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Block table is missing the 'blocks' array."))?;
    blocks
        .iter()
        .map(|entry| parse_block_def(entry).map_err(anyhow::Error::from))
        .collect()
}

fn parse_block_def(entry: &Value) -> Result<BlockSpec, RegistryError> {
    let id = required_str(entry, "id", "<unnamed>")?;
    let module = required_str(entry, "module", id)?;
    let symbol = entry.get("symbol").and_then(Value::as_str).unwrap_or(id);
    let call = required_str(entry, "call", id)?;

    let mut slots = Vec::new();
    if let Some(defs) = entry.get("slots").and_then(Value::as_array) {
        for def in defs {
            let name = required_str(def, "name", id)?;
            let kind_name = def.get("kind").and_then(Value::as_str).unwrap_or("expr");
            let kind = SlotKind::parse(kind_name).ok_or_else(|| RegistryError::UnknownKind {
                block: id.to_string(),
                kind: kind_name.to_string(),
            })?;
            slots.push(Slot::new(name, kind));
        }
    }

    let notes = entry
        .get("notes")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    BlockSpec::new(id, module, symbol, slots, call, notes)
}

fn required_str<'v>(entry: &'v Value, key: &str, block: &str) -> Result<&'v str, RegistryError> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RegistryError::Invalid(format!("block '{}' is missing '{}'", block, key)))
}
