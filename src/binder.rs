use crate::error::GenerateError;
use crate::registry::{BlockSpec, Slot, SlotKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Raw `code` tokens an editor supplied for one block instance, keyed by slot name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBindings {
    codes: HashMap<String, String>,
}

impl RawBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: impl Into<String>, code: impl Into<String>) -> Self {
        self.insert(slot, code);
        self
    }

    pub fn insert(&mut self, slot: impl Into<String>, code: impl Into<String>) {
        self.codes.insert(slot.into(), code.into());
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.codes.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = RawBindings::new();
        for (slot, code) in iter {
            bindings.insert(slot, code);
        }
        bindings
    }
}

/// Normalizes every declared slot of `spec`, in slot order.
pub fn bind(spec: &BlockSpec, raw: &RawBindings) -> Result<Vec<String>, GenerateError> {
    spec.slots()
        .iter()
        .map(|slot| {
            let code = raw
                .get(&slot.name)
                .ok_or_else(|| GenerateError::MissingParameter {
                    block: spec.id().to_string(),
                    slot: slot.name.clone(),
                })?;
            normalize(spec.id(), slot, code)
        })
        .collect()
}

fn normalize(block: &str, slot: &Slot, code: &str) -> Result<String, GenerateError> {
    match slot.kind {
        SlotKind::Number => {
            if is_numeric_literal(code) {
                Ok(code.to_string())
            } else {
                Err(GenerateError::malformed(block, &slot.name, code, "not a number"))
            }
        }
        SlotKind::String => match scan_quoted(code) {
            Ok(true) => Ok(code.to_string()),
            Ok(false) => Ok(quote(code)),
            Err(reason) => Err(GenerateError::malformed(block, &slot.name, code, reason)),
        },
        SlotKind::List | SlotKind::Expr => {
            let trimmed = code.trim();
            if trimmed.is_empty() {
                return Err(GenerateError::malformed(block, &slot.name, code, "empty expression"));
            }
            if slot.kind == SlotKind::List && trimmed.starts_with('[') && !trimmed.ends_with(']') {
                return Err(GenerateError::malformed(
                    block,
                    &slot.name,
                    code,
                    "unterminated list literal",
                ));
            }
            Ok(code.to_string())
        }
    }
}

fn is_numeric_literal(code: &str) -> bool {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE
        .get_or_init(|| {
            Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
                .expect("numeric literal pattern is valid")
        })
        .is_match(code)
}

/// `Ok(true)` for a complete quoted literal, `Ok(false)` for bare text.
fn scan_quoted(code: &str) -> Result<bool, &'static str> {
    // A backslash never closes the literal, raw prefix or not.
    let body = match code.strip_prefix(['r', 'R', 'u', 'U']) {
        Some(rest) if rest.starts_with(['"', '\'']) => rest,
        _ => code,
    };
    let mut chars = body.chars();
    let quote = match chars.next() {
        Some(c @ ('"' | '\'')) => c,
        _ => return Ok(false),
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\n' | '\r' => return Err("line break inside string literal"),
            '\\' => {
                if chars.next().is_none() {
                    return Err("unterminated string literal");
                }
            }
            c if c == quote => {
                if chars.next().is_some() {
                    return Err("text after closing quote");
                }
                return Ok(true);
            }
            _ => {}
        }
    }
    Err("unterminated string literal")
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockRegistry;

    fn registry() -> BlockRegistry {
        BlockRegistry::builtin().unwrap()
    }

    fn single_slot(block: &str, slot: &str, kind: SlotKind) -> BlockSpec {
        BlockSpec::new(
            block,
            "learn",
            block,
            vec![Slot::new(slot, kind)],
            format!("{}({{{}}})", block, slot),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn numbers_pass_through_verbatim() {
        let spec = single_slot("set_max_iter", "MAX_ITER", SlotKind::Number);
        for code in ["0", "-1", "1.50", "1e-3", ".5"] {
            let tokens = bind(&spec, &RawBindings::new().with("MAX_ITER", code)).unwrap();
            assert_eq!(tokens, vec![code.to_string()]);
        }
    }

    #[test]
    fn non_numbers_are_rejected_in_number_slots() {
        let spec = single_slot("set_max_iter", "MAX_ITER", SlotKind::Number);
        for code in ["", "one", "1,5", " 1", "0x"] {
            let err = bind(&spec, &RawBindings::new().with("MAX_ITER", code)).unwrap_err();
            assert!(matches!(err, GenerateError::MalformedLiteral { .. }), "{code:?}");
        }
    }

    #[test]
    fn bare_strings_are_wrapped_and_escaped() {
        let spec = &single_slot("open_dataset", "PATH", SlotKind::String);
        let tokens = bind(spec, &RawBindings::new().with("PATH", "my_model.h5")).unwrap();
        assert_eq!(tokens, vec!["\"my_model.h5\"".to_string()]);

        let tokens = bind(
            spec,
            &RawBindings::new().with("PATH", r#"C:\models\say "hi""#),
        )
        .unwrap();
        assert_eq!(tokens, vec![r#""C:\\models\\say \"hi\"""#.to_string()]);
    }

    #[test]
    fn quoted_strings_are_used_verbatim() {
        let spec = &single_slot("open_dataset", "PATH", SlotKind::String);
        for code in ["\"model.h5\"", "'model.h5'", r#"r"C:\models\m.h5""#, r#""a \" b""#] {
            let tokens = bind(spec, &RawBindings::new().with("PATH", code)).unwrap();
            assert_eq!(tokens, vec![code.to_string()]);
        }
    }

    #[test]
    fn broken_quoted_strings_are_malformed() {
        let spec = &single_slot("open_dataset", "PATH", SlotKind::String);
        for (code, reason) in [
            ("\"model.h5", "unterminated string literal"),
            ("'a' + 'b'", "text after closing quote"),
            ("\"a\nb\"", "line break inside string literal"),
            ("\"", "unterminated string literal"),
        ] {
            let err = bind(spec, &RawBindings::new().with("PATH", code)).unwrap_err();
            assert_eq!(
                err,
                GenerateError::malformed("open_dataset", "PATH", code, reason)
            );
        }
    }

    #[test]
    fn expressions_and_lists_are_not_reformatted() {
        let registry = registry();
        let spec = registry.get("infer").unwrap();
        let raw = RawBindings::new()
            .with("MODEL", "model")
            .with("CONDITION", "['timestamp', 'pir',  'touch']");
        let tokens = bind(spec, &raw).unwrap();
        assert_eq!(tokens, vec!["model", "['timestamp', 'pir',  'touch']"]);

        let raw = RawBindings::new().with("MODEL", "model").with("CONDITION", "[1, 2");
        assert!(matches!(
            bind(spec, &raw),
            Err(GenerateError::MalformedLiteral { ref slot, .. }) if slot == "CONDITION"
        ));

        let raw = RawBindings::new().with("MODEL", "  ").with("CONDITION", "data");
        assert!(matches!(
            bind(spec, &raw),
            Err(GenerateError::MalformedLiteral { ref slot, .. }) if slot == "MODEL"
        ));
    }

    #[test]
    fn missing_slot_is_reported_by_name() {
        let registry = registry();
        let spec = registry.get("train_decision_tree").unwrap();
        let err = bind(spec, &RawBindings::new().with("PATH", "data")).unwrap_err();
        assert_eq!(
            err,
            GenerateError::MissingParameter {
                block: "train_decision_tree".to_string(),
                slot: "TARGET".to_string()
            }
        );
    }

    #[test]
    fn tokens_follow_visual_slot_order() {
        let registry = registry();
        let spec = registry.get("predict").unwrap();
        let raw: RawBindings = [("MODEL", "m"), ("CLASS_NAMES", "classes"), ("IMAGE_PATH", "img.jpg")]
            .into_iter()
            .collect();
        assert_eq!(
            bind(spec, &raw).unwrap(),
            vec!["\"img.jpg\"", "\"m\"", "\"classes\""]
        );
    }
}
