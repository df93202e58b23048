use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0} buffer is unavailable")]
    BufferUnavailable(&'static str),

    #[error("{name} holds {actual} values, the callback reads {expected}")]
    MalformedBuffer {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{name} holds {len} elements, more than a callback length can express")]
    OversizeBuffer { name: &'static str, len: usize },

    #[error("camera plugin instance could not be resolved: {0}")]
    InstanceUnavailable(String),

    #[error("provided object is not an android.content.Context")]
    NotAContext,

    #[error("host exception raised while calling {0}")]
    HostException(&'static str),

    #[error("no Java VM has been recorded, the library was not loaded through System.loadLibrary")]
    VmUnavailable,

    #[error(transparent)]
    Jni(#[from] jni::errors::Error),
}

impl BridgeError {
    /// Label used by the drop counters.
    pub fn drop_reason(&self) -> &'static str {
        match self {
            BridgeError::MalformedBuffer { .. } | BridgeError::OversizeBuffer { .. } => "malformed",
            _ => "unavailable",
        }
    }
}
