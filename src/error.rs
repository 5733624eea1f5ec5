use thiserror::Error;

/// Failure while turning one block instance into source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Block '{block}' is missing a value for parameter '{slot}'.")]
    MissingParameter { block: String, slot: String },

    #[error("Block '{block}' parameter '{slot}' is not a valid literal ({reason}): {token}")]
    MalformedLiteral {
        block: String,
        slot: String,
        token: String,
        reason: String,
    },

    #[error("Unknown block '{block}'.")]
    UnknownBlockSpec { block: String },
}

impl GenerateError {
    /// Unknown blocks abort the whole pass; the other kinds only fail one instance.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GenerateError::UnknownBlockSpec { .. })
    }

    pub(crate) fn malformed(block: &str, slot: &str, token: &str, reason: &str) -> Self {
        GenerateError::MalformedLiteral {
            block: block.to_string(),
            slot: slot.to_string(),
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Problems in a block table definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Block '{0}' is already registered.")]
    DuplicateBlock(String),

    #[error("Block '{block}' declares parameter '{slot}' more than once.")]
    DuplicateSlot { block: String, slot: String },

    #[error("Block '{block}' call template references undeclared parameter '{slot}'.")]
    UnknownSlot { block: String, slot: String },

    #[error("Block '{block}' declares parameter '{slot}' but its call template never uses it.")]
    UnusedSlot { block: String, slot: String },

    #[error("Block '{block}' call template has an unbalanced brace: {template}")]
    UnbalancedTemplate { block: String, template: String },

    #[error("Block '{block}' has unknown parameter kind '{kind}'.")]
    UnknownKind { block: String, kind: String },

    #[error("Block definition is invalid: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unknown_blocks_are_fatal() {
        assert!(GenerateError::UnknownBlockSpec {
            block: "nope".to_string()
        }
        .is_fatal());
        assert!(!GenerateError::MissingParameter {
            block: "infer".to_string(),
            slot: "MODEL".to_string()
        }
        .is_fatal());
        assert!(!GenerateError::malformed("capture_webcam_image", "CAMERA_INDEX", "x", "not a number").is_fatal());
    }

    #[test]
    fn messages_name_block_and_slot() {
        let err = GenerateError::MissingParameter {
            block: "predict".to_string(),
            slot: "MODEL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Block 'predict' is missing a value for parameter 'MODEL'."
        );
    }
}
