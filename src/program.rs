use crate::binder::RawBindings;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One placed block: which block it is and the editor's parameter codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInstance {
    pub block: String,
    pub bindings: RawBindings,
}

pub fn read_program_file(path: &Path) -> Result<Vec<BlockInstance>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read program '{}'.", path.display()))?;
    parse_program(&text).with_context(|| format!("Invalid program document '{}'.", path.display()))
}

pub fn parse_program(text: &str) -> Result<Vec<BlockInstance>> {
    let doc: Value = serde_json::from_str(text).context("Program is not valid JSON.")?;
    let blocks = match &doc {
        Value::Array(items) => items,
        Value::Object(_) => doc
            .get("blocks")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("Program is missing the 'blocks' array."))?,
        _ => bail!("Program must be a JSON object or array."),
    };
    blocks
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_instance(entry).with_context(|| format!("In block #{}.", index + 1)))
        .collect()
}

fn parse_instance(entry: &Value) -> Result<BlockInstance> {
    let block = entry
        .get("block")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("Block entry is missing a 'block' id."))?;
    let bindings = match entry.get("parameters") {
        None | Some(Value::Null) => RawBindings::new(),
        Some(value) => parse_parameters(value)?,
    };
    Ok(BlockInstance {
        block: block.to_string(),
        bindings,
    })
}

/// `{ SLOT: { "code": ... } }`. A null or absent code is left out so the
/// binder reports the slot as missing.
pub fn parse_parameters(value: &Value) -> Result<RawBindings> {
    let params = value
        .as_object()
        .ok_or_else(|| anyhow!("'parameters' must be an object."))?;
    let mut bindings = RawBindings::new();
    for (slot, binding) in params {
        let code = match binding.get("code") {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.clone(),
            // Digits are kept as written; `arbitrary_precision` is on.
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => bail!(
                "Parameter '{}' has a non-scalar code: {}",
                slot,
                other
            ),
        };
        bindings.insert(slot.clone(), code);
    }
    Ok(bindings)
}
