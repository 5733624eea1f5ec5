use crate::error::RegistryError;
use crate::registry::{BlockSpec, Slot, SlotKind};

const LEARN_MODULE: &str = "learn";

struct BlockDef {
    id: &'static str,
    slots: &'static [(&'static str, SlotKind)],
    call: &'static str,
    notes: &'static [&'static str],
}

const SENSOR_DATA_NOTES: &[&str] = &[
    "# This block LOADS sensor data from the following directories:",
    "# Windows: C:\\Users\\{your user name}\\sensor_data",
    "# MacOS: /Users/{your user name}/sensor_data",
    "# Linux: /home/{your user name}/sensor_data",
    "# Enter ONLY the file name in the block (e.g. data)",
];

const WEBCAM_IMAGE_NOTES: &[&str] = &[
    "# This block captures an image from the webcam and saves it to:",
    "# Windows: C:\\Users\\{your user name}\\webcam_images",
    "# MacOS: /Users/{your user name}/webcam_images",
    "# Linux: /home/{your user name}/webcam_images",
];

const LOAD_MODEL_NOTES: &[&str] = &[
    "# This block loads a custom trained model from:",
    "# Local files: ~/models/model.keras",
    "# URLs: https://github.com/user/repo/raw/main/model.keras",
    "# Downloaded models cached in: ~/models/cache/",
];

const LABEL_FROM_IMAGE_NOTES: &[&str] = &[
    "# Predict on existing image: returns only label (string)",
    "# Use pre-loaded model object for efficiency",
    "# Use Mind+ list blocks to create class_names list",
];

const CONFIDENCE_FROM_IMAGE_NOTES: &[&str] = &[
    "# Predict on existing image: returns only confidence (float 0.0-1.0)",
    "# Use pre-loaded model object for efficiency",
    "# Use Mind+ list blocks to create class_names list",
];

const WEBCAM_LABEL_NOTES: &[&str] = &[
    "# Captures a webcam frame and returns only label (string)",
    "# Use pre-loaded model object for efficiency",
];

const WEBCAM_CONFIDENCE_NOTES: &[&str] = &[
    "# Captures a webcam frame and returns only confidence (float 0.0-1.0)",
    "# Use pre-loaded model object for efficiency",
];

const SEND_PREDICTION_NOTES: &[&str] = &[
    "# Sends JSON with base64 image, label, confidence to REST API",
    "# Returns API response or error information",
    "# Includes timestamp and automatic error handling",
];

const LEARN_BLOCKS: &[BlockDef] = &[
    BlockDef {
        id: "train_decision_tree",
        slots: &[("PATH", SlotKind::String), ("TARGET", SlotKind::String)],
        call: "train_decision_tree({PATH}, {TARGET})",
        notes: SENSOR_DATA_NOTES,
    },
    BlockDef {
        id: "train_neural_network",
        slots: &[("PATH", SlotKind::String), ("TARGET", SlotKind::String)],
        call: "train_neural_network({PATH}, {TARGET})",
        notes: SENSOR_DATA_NOTES,
    },
    BlockDef {
        id: "infer",
        slots: &[("MODEL", SlotKind::Expr), ("CONDITION", SlotKind::List)],
        call: "infer({MODEL}, {CONDITION})",
        notes: &[],
    },
    BlockDef {
        id: "capture_webcam_image",
        slots: &[("CAMERA_INDEX", SlotKind::Expr)],
        call: "capture_webcam_image({CAMERA_INDEX})",
        notes: WEBCAM_IMAGE_NOTES,
    },
    BlockDef {
        id: "load_custom_model",
        slots: &[("MODEL_PATH", SlotKind::Expr)],
        call: "load_custom_model({MODEL_PATH})",
        notes: LOAD_MODEL_NOTES,
    },
    BlockDef {
        id: "predict",
        slots: &[
            ("IMAGE_PATH", SlotKind::String),
            ("MODEL", SlotKind::String),
            ("CLASS_NAMES", SlotKind::String),
        ],
        call: "predict({MODEL}, {IMAGE_PATH}, {CLASS_NAMES})",
        notes: &[],
    },
    BlockDef {
        id: "predict_label_from_image",
        slots: &[
            ("IMAGE", SlotKind::Expr),
            ("MODEL", SlotKind::Expr),
            ("CLASS_NAMES", SlotKind::List),
        ],
        call: "predict_label_from_image({MODEL}, {IMAGE}, {CLASS_NAMES})",
        notes: LABEL_FROM_IMAGE_NOTES,
    },
    BlockDef {
        id: "predict_confidence_from_image",
        slots: &[
            ("IMAGE", SlotKind::Expr),
            ("MODEL", SlotKind::Expr),
            ("CLASS_NAMES", SlotKind::List),
        ],
        call: "predict_confidence_from_image({MODEL}, {IMAGE}, {CLASS_NAMES})",
        notes: CONFIDENCE_FROM_IMAGE_NOTES,
    },
    BlockDef {
        id: "webcam_predict_label",
        slots: &[
            ("CAMERA_INDEX", SlotKind::Expr),
            ("MODEL", SlotKind::Expr),
            ("CLASS_NAMES", SlotKind::List),
        ],
        call: "webcam_predict_label({MODEL}, {CLASS_NAMES}, {CAMERA_INDEX})",
        notes: WEBCAM_LABEL_NOTES,
    },
    BlockDef {
        id: "webcam_predict_confidence",
        slots: &[
            ("CAMERA_INDEX", SlotKind::Expr),
            ("MODEL", SlotKind::Expr),
            ("CLASS_NAMES", SlotKind::List),
        ],
        call: "webcam_predict_confidence({MODEL}, {CLASS_NAMES}, {CAMERA_INDEX})",
        notes: WEBCAM_CONFIDENCE_NOTES,
    },
    BlockDef {
        id: "send_prediction_data",
        slots: &[
            ("IMAGE", SlotKind::Expr),
            ("LABEL", SlotKind::Expr),
            ("CONFIDENCE", SlotKind::Expr),
            ("API_URL", SlotKind::Expr),
        ],
        call: "send_prediction_data({IMAGE}, {LABEL}, {CONFIDENCE}, {API_URL})",
        notes: SEND_PREDICTION_NOTES,
    },
];

/// The `learn` library blocks shipped with the editor extension.
pub fn builtin_specs() -> Result<Vec<BlockSpec>, RegistryError> {
    LEARN_BLOCKS.iter().map(to_spec).collect()
}

fn to_spec(def: &BlockDef) -> Result<BlockSpec, RegistryError> {
    BlockSpec::new(
        def.id,
        LEARN_MODULE,
        def.id,
        def.slots
            .iter()
            .map(|(name, kind)| Slot::new(*name, *kind))
            .collect(),
        def.call,
        def.notes.iter().map(|line| line.to_string()).collect(),
    )
}
