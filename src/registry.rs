use crate::error::RegistryError;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Number,
    String,
    List,
    Expr,
}

impl SlotKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "number" | "num" => Some(SlotKind::Number),
            "string" | "str" => Some(SlotKind::String),
            "list" => Some(SlotKind::List),
            "expr" | "expression" | "normal" => Some(SlotKind::Expr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotKind::Number => "number",
            SlotKind::String => "string",
            SlotKind::List => "list",
            SlotKind::Expr => "expr",
        }
    }
}

impl Display for SlotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub kind: SlotKind,
}

impl Slot {
    pub fn new(name: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Piece of a compiled call template. `Arg` holds an index into the block's slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Text(String),
    Arg(usize),
}

/// Static description of one block: its slots in visual order, the import it
/// needs, and the call it emits. The call template decides argument order.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    id: String,
    import: String,
    slots: Vec<Slot>,
    call: String,
    template: Vec<TemplatePart>,
    notes: Vec<String>,
}

impl BlockSpec {
    pub fn new(
        id: impl Into<String>,
        module: &str,
        symbol: &str,
        slots: Vec<Slot>,
        call: impl Into<String>,
        notes: Vec<String>,
    ) -> Result<Self, RegistryError> {
        let id = id.into();
        let call = call.into();
        if id.trim().is_empty() {
            return Err(RegistryError::Invalid("block id must not be empty".to_string()));
        }
        if module.trim().is_empty() || symbol.trim().is_empty() {
            return Err(RegistryError::Invalid(format!(
                "block '{}' needs both an import module and symbol",
                id
            )));
        }

        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(RegistryError::DuplicateSlot {
                    block: id,
                    slot: slot.name.clone(),
                });
            }
        }

        let template = compile_template(&id, &call, &slots)?;
        Ok(Self {
            import: format!("from {} import {}", module.trim(), symbol.trim()),
            id,
            slots,
            call,
            template,
            notes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn import_line(&self) -> &str {
        &self.import
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn call(&self) -> &str {
        &self.call
    }

    pub fn template(&self) -> &[TemplatePart] {
        &self.template
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn signature(&self) -> String {
        let params = self
            .slots
            .iter()
            .map(|slot| format!("{}: {}", slot.name, slot.kind))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}) -> {}", self.id, params, self.call)
    }
}

fn compile_template(block: &str, call: &str, slots: &[Slot]) -> Result<Vec<TemplatePart>, RegistryError> {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    let placeholder_re = PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    });
    let unbalanced = || RegistryError::UnbalancedTemplate {
        block: block.to_string(),
        template: call.to_string(),
    };

    let mut parts = Vec::new();
    let mut used = vec![false; slots.len()];
    let mut last = 0usize;
    for caps in placeholder_re.captures_iter(call) {
        let whole = caps.get(0).ok_or_else(unbalanced)?;
        let text = &call[last..whole.start()];
        if text.contains('{') || text.contains('}') {
            return Err(unbalanced());
        }
        if !text.is_empty() {
            parts.push(TemplatePart::Text(text.to_string()));
        }
        let name = &caps[1];
        let index = slots
            .iter()
            .position(|slot| slot.name == name)
            .ok_or_else(|| RegistryError::UnknownSlot {
                block: block.to_string(),
                slot: name.to_string(),
            })?;
        used[index] = true;
        parts.push(TemplatePart::Arg(index));
        last = whole.end();
    }
    let tail = &call[last..];
    if tail.contains('{') || tail.contains('}') {
        return Err(unbalanced());
    }
    if !tail.is_empty() {
        parts.push(TemplatePart::Text(tail.to_string()));
    }

    if let Some(index) = used.iter().position(|u| !u) {
        return Err(RegistryError::UnusedSlot {
            block: block.to_string(),
            slot: slots[index].name.clone(),
        });
    }
    Ok(parts)
}

/// Lookup table of every block the generator knows, in registration order.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    specs: Vec<BlockSpec>,
    index: HashMap<String, usize>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for spec in crate::learn_blocks::builtin_specs()? {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, spec: BlockSpec) -> Result<(), RegistryError> {
        if self.index.contains_key(spec.id()) {
            return Err(RegistryError::DuplicateBlock(spec.id().to_string()));
        }
        self.index.insert(spec.id().to_string(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&BlockSpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
