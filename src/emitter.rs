use crate::registry::{BlockSpec, TemplatePart};

/// Output of one block instance: the import it needs and its source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFragment {
    pub import: String,
    pub lines: Vec<String>,
}

/// `tokens` must be the output of `bind` for the same spec: one token per slot, in slot order.
pub(crate) fn emit(spec: &BlockSpec, tokens: &[String]) -> EmittedFragment {
    debug_assert_eq!(tokens.len(), spec.slots().len());

    let mut call = String::new();
    for part in spec.template() {
        match part {
            TemplatePart::Text(text) => call.push_str(text),
            TemplatePart::Arg(index) => call.push_str(&tokens[*index]),
        }
    }

    let mut lines = Vec::with_capacity(1 + spec.notes().len());
    lines.push(call);
    lines.extend(spec.notes().iter().cloned());
    EmittedFragment {
        import: spec.import_line().to_string(),
        lines,
    }
}
