/// Crate-wide result alias.
pub type TrimResult<T> = Result<T, TrimError>;

/// Errors produced by transcript loading, render staging and the media engine.
#[derive(thiserror::Error, Debug)]
pub enum TrimError {
    /// Invalid caller input (bad config, reserved asset name, render guard).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed transcript source.
    #[error("transcript error: {0}")]
    Transcript(String),

    /// The media engine is unavailable or a submitted job failed.
    #[error("engine error: {0}")]
    Engine(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrimError {
    /// Build a [`TrimError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrimError::Transcript`].
    pub fn transcript(msg: impl Into<String>) -> Self {
        Self::Transcript(msg.into())
    }

    /// Build a [`TrimError::Engine`].
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`TrimError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_and_engine_errors_name_their_origin() {
        let bad_key = TrimError::transcript("timestamp key 'abc' is not a number");
        assert_eq!(
            bad_key.to_string(),
            "transcript error: timestamp key 'abc' is not a number"
        );

        let failed_job = TrimError::engine("ffmpeg exited with status 1");
        assert!(matches!(failed_job, TrimError::Engine(ref m) if m.starts_with("ffmpeg")));
        assert_eq!(
            failed_job.to_string(),
            "engine error: ffmpeg exited with status 1"
        );
    }

    #[test]
    fn reserved_name_rejection_reads_as_validation() {
        let err = TrimError::validation("intro file name 'output.mp4' is reserved");
        assert!(err.to_string().starts_with("validation error: intro"));
        assert!(
            TrimError::serde("parse config")
                .to_string()
                .starts_with("serialization error:")
        );
    }

    #[test]
    fn io_context_survives_conversion() {
        use anyhow::Context as _;

        let staged: anyhow::Result<()> = Err(std::io::Error::other("disk full"))
            .context("failed to stage 'original.mp4'");
        let err: TrimError = staged.unwrap_err().into();
        let shown = format!("{err:#}");
        assert!(shown.contains("failed to stage 'original.mp4'"));
        assert!(shown.contains("disk full"));
    }
}
