/// Crate-wide result alias.
pub type NewsreelResult<T> = Result<T, NewsreelError>;

/// Error type shared by every stage of the render pipeline.
///
/// The variant tells the caller which failure class it belongs to: `Narration` and `Encode`
/// abort a render, `Media`, `Text` and `Provider` are recovered per scene by the stage that
/// raised them.
#[derive(thiserror::Error, Debug)]
pub enum NewsreelError {
    /// Invalid input data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A media asset could not be probed, decoded or written.
    #[error("media error: {0}")]
    Media(String),

    /// Text layout or font resolution failed.
    #[error("text error: {0}")]
    Text(String),

    /// Narration synthesis failed or its duration could not be measured.
    #[error("narration error: {0}")]
    Narration(String),

    /// Frame assembly or container encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// An external collaborator (script, enrichment, media) failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually filesystem plumbing with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NewsreelError {
    /// Build a [`NewsreelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NewsreelError::Media`].
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`NewsreelError::Text`].
    pub fn text(msg: impl Into<String>) -> Self {
        Self::Text(msg.into())
    }

    /// Build a [`NewsreelError::Narration`].
    pub fn narration(msg: impl Into<String>) -> Self {
        Self::Narration(msg.into())
    }

    /// Build a [`NewsreelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`NewsreelError::Provider`].
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Build a [`NewsreelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for failures that abort the whole render request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Narration(_) | Self::Encode(_) | Self::Validation(_) | Self::Other(_)
        )
    }
}

impl From<serde_json::Error> for NewsreelError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}
