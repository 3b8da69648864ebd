use crate::Frame;

/// Failures raised by the low-level multitrack primitives.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("track {track} does not exist")]
    TrackOutOfRange { track: usize },
    #[error("position {0} is negative")]
    NegativePosition(Frame),
    #[error("cannot cut through a transition at frame {position}")]
    SplitTransition { position: Frame },
    #[error("clip range [{frame_in}, {frame_out}] is outside a {length} frame producer")]
    InvalidRange {
        frame_in: Frame,
        frame_out: Frame,
        length: Frame,
    },
    #[error("payload contains no clips")]
    EmptyPayload,
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
