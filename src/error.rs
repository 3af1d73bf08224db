use thiserror::Error;
use wire_sequence_common::EndLabel;

#[derive(Error, Debug)]
pub enum WireSeqError {
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no wire detected at {end} end")]
    NoWireDetected { end: EndLabel },

    #[error("ambiguous segmentation at {end} end: {slivers} noisy boundary slivers for {wires} wire(s)")]
    AmbiguousSegmentation {
        end: EndLabel,
        slivers: usize,
        wires: usize,
    },

    #[error("invalid reference sequence: {0}")]
    InvalidReference(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] wire_sequence_common::Error),
}

impl WireSeqError {
    /// エラーエンベロープの `kind`
    pub fn kind(&self) -> &'static str {
        match self {
            WireSeqError::Decode(_) => "decode_error",
            WireSeqError::InvalidInput(_) => "invalid_input",
            WireSeqError::NoWireDetected { .. } => "no_wire_detected",
            WireSeqError::AmbiguousSegmentation { .. } => "ambiguous_segmentation",
            WireSeqError::InvalidReference(_) => "invalid_reference",
            WireSeqError::Config(_) => "config",
            WireSeqError::JsonParse(_) => "json",
            WireSeqError::Io(_) => "io",
            WireSeqError::Common(wire_sequence_common::Error::Config(_)) => "config",
            WireSeqError::Common(wire_sequence_common::Error::Json(_)) => "json",
            WireSeqError::Common(wire_sequence_common::Error::InvalidShape(_)) => "invalid_input",
        }
    }

    /// 撮り直しで解消しうるエラーか
    pub fn is_recapture(&self) -> bool {
        matches!(
            self,
            WireSeqError::Decode(_)
                | WireSeqError::NoWireDetected { .. }
                | WireSeqError::AmbiguousSegmentation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WireSeqError>;
