use crate::binder::{bind, RawBindings};
use crate::buffer::{ProgramBuffer, RenderOptions};
use crate::emitter::{emit, EmittedFragment};
use crate::error::GenerateError;
use crate::program::BlockInstance;
use crate::registry::BlockRegistry;
use std::fmt::{Display, Formatter};

/// Binds and emits one block instance without touching any buffer.
pub fn generate_fragment(
    registry: &BlockRegistry,
    block: &str,
    raw: &RawBindings,
) -> Result<EmittedFragment, GenerateError> {
    let spec = registry
        .get(block)
        .ok_or_else(|| GenerateError::UnknownBlockSpec {
            block: block.to_string(),
        })?;
    let tokens = bind(spec, raw)?;
    Ok(emit(spec, &tokens))
}

/// One compilation pass. Owns the buffer its block instances append to.
pub struct CompileSession<'a> {
    registry: &'a BlockRegistry,
    buffer: ProgramBuffer,
}

impl<'a> CompileSession<'a> {
    pub fn new(registry: &'a BlockRegistry) -> Self {
        Self {
            registry,
            buffer: ProgramBuffer::new(),
        }
    }

    /// Appends the instance's output, or nothing at all when it fails.
    pub fn generate(&mut self, block: &str, raw: &RawBindings) -> Result<usize, GenerateError> {
        let fragment = generate_fragment(self.registry, block, raw)?;
        let line_count = fragment.lines.len();
        let instance = self.buffer.append(fragment);
        tracing::debug!(block, instance, lines = line_count, "generated block");
        Ok(instance)
    }

    pub fn register_import(&mut self, import: &str) -> bool {
        self.buffer.register_import(import)
    }

    pub fn register_code_line(&mut self, line: impl Into<String>) {
        self.buffer.register_code_line(line);
    }

    pub fn buffer(&self) -> &ProgramBuffer {
        &self.buffer
    }

    pub fn finalize(&self) -> String {
        self.buffer.finalize()
    }

    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    pub fn into_buffer(self) -> ProgramBuffer {
        self.buffer
    }
}

/// A failed block instance, by its position in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceError {
    pub position: usize,
    pub block: String,
    pub error: GenerateError,
}

impl Display for InstanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "block #{} ('{}'): {}", self.position + 1, self.block, self.error)
    }
}

#[derive(Debug, Clone)]
pub struct CompileReport {
    pub buffer: ProgramBuffer,
    pub errors: Vec<InstanceError>,
    pub aborted: bool,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn render(&self, options: RenderOptions) -> String {
        self.buffer.render(options)
    }
}

/// Runs every instance in order. Instance failures are collected; an unknown
/// block stops the pass since nothing after it can be trusted.
pub fn compile_program(registry: &BlockRegistry, instances: &[BlockInstance]) -> CompileReport {
    let mut session = CompileSession::new(registry);
    let mut errors = Vec::new();
    let mut aborted = false;
    for (position, instance) in instances.iter().enumerate() {
        if let Err(error) = session.generate(&instance.block, &instance.bindings) {
            tracing::warn!(position, block = %instance.block, %error, "block generation failed");
            let fatal = error.is_fatal();
            errors.push(InstanceError {
                position,
                block: instance.block.clone(),
                error,
            });
            if fatal {
                aborted = true;
                break;
            }
        }
    }
    tracing::info!(
        instances = instances.len(),
        failed = errors.len(),
        aborted,
        "compilation pass finished"
    );
    CompileReport {
        buffer: session.into_buffer(),
        errors,
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BlockRegistry {
        BlockRegistry::builtin().unwrap()
    }

    fn instance(block: &str, bindings: &[(&str, &str)]) -> BlockInstance {
        BlockInstance {
            block: block.to_string(),
            bindings: bindings.iter().copied().collect(),
        }
    }

    #[test]
    fn failed_instance_leaves_buffer_untouched() {
        let registry = registry();
        let mut session = CompileSession::new(&registry);
        session
            .generate("capture_webcam_image", &RawBindings::new().with("CAMERA_INDEX", "0"))
            .unwrap();
        let before = session.finalize();

        let err = session
            .generate("predict", &RawBindings::new().with("MODEL", "m"))
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingParameter { .. }));
        let err = session
            .generate(
                "infer",
                &RawBindings::new().with("MODEL", "model").with("CONDITION", "['pir', 'touch'"),
            )
            .unwrap_err();
        assert!(matches!(err, GenerateError::MalformedLiteral { .. }));

        assert_eq!(session.finalize(), before);
        assert_eq!(session.buffer().instance_count(), 1);
    }

    #[test]
    fn unknown_block_is_reported() {
        let registry = registry();
        let mut session = CompileSession::new(&registry);
        assert_eq!(
            session.generate("train_random_forest", &RawBindings::new()),
            Err(GenerateError::UnknownBlockSpec {
                block: "train_random_forest".to_string()
            })
        );
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn host_lines_interleave_with_blocks() {
        let registry = registry();
        let mut session = CompileSession::new(&registry);
        session.register_code_line("camera_id = 1");
        session
            .generate("capture_webcam_image", &RawBindings::new().with("CAMERA_INDEX", "camera_id"))
            .unwrap();
        session.register_import("import os");
        session.register_code_line("print(camera_id)");
        let lines = session.buffer().lines();
        assert_eq!(lines[0], "camera_id = 1");
        assert_eq!(lines[1], "capture_webcam_image(camera_id)");
        assert_eq!(lines.last().map(String::as_str), Some("print(camera_id)"));
        assert_eq!(
            session.buffer().imports(),
            &["from learn import capture_webcam_image", "import os"]
        );

        session.reset();
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn compile_collects_instance_errors_and_continues() {
        let registry = registry();
        let program = vec![
            instance("capture_webcam_image", &[("CAMERA_INDEX", "0")]),
            instance("load_custom_model", &[]),
            instance("capture_webcam_image", &[("CAMERA_INDEX", "1")]),
        ];
        let report = compile_program(&registry, &program);
        assert!(!report.is_success());
        assert!(!report.aborted);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].position, 1);
        assert_eq!(
            report.errors[0].to_string(),
            "block #2 ('load_custom_model'): Block 'load_custom_model' is missing a value for parameter 'MODEL_PATH'."
        );
        assert_eq!(report.buffer.instance_count(), 2);
    }

    #[test]
    fn compile_stops_at_unknown_block() {
        let registry = registry();
        let program = vec![
            instance("capture_webcam_image", &[("CAMERA_INDEX", "0")]),
            instance("make_coffee", &[]),
            instance("capture_webcam_image", &[("CAMERA_INDEX", "1")]),
        ];
        let report = compile_program(&registry, &program);
        assert!(report.aborted);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.buffer.instance_count(), 1);
    }
}
