//! Data types shared by the rotation core and the retention layer

mod status;

pub use status::{RotationDecision, RotationEvent, RotationStatus};
