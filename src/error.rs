use thiserror::Error;

/// Construction-time failures. Fatal to the instance being built; nothing
/// should proceed to render after one of these.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("size {size}px leaves no room for a {wave_length}px wave band (radius must be > 0)")]
    Geometry { size: u32, wave_length: u32 },

    #[error("viewport height must be > 0")]
    Viewport,

    #[error("audio source is unusable: {0}")]
    AudioSource(String),

    #[error("drawing surface is unusable: {0}")]
    Surface(String),

    #[error("invalid color literal {0:?} (expected #RRGGBB)")]
    Color(String),
}
