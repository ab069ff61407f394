use thiserror::Error;
use context::texture_manager::TextureError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameGraphError {
    #[error("task \"{task}\" cannot be added while task \"{recording}\" is recording")]
    TaskAddedWhileRecording {
        task: String,
        recording: String
    },
    #[error("pass \"{0}\" can only be added from a task's record()")]
    PassAddedOutsideRecording(String),
    #[error("cannot {operation} while task \"{task}\" is recording")]
    CalledWhileRecording {
        operation: &'static str,
        task: String
    },
    #[error("pass \"{pass}\" of task \"{task}\" is invalid: {reason}")]
    InvalidPass {
        task: String,
        pass: String,
        reason: String
    },
    #[error("task \"{0}\" writes different output textures when disabled")]
    OutputTextureMismatch(String),
    #[error("task \"{0}\" writes a different output depth texture when disabled")]
    OutputDepthMismatch(String),
    #[error("task \"{0}\" outputs a different object list when disabled")]
    OutputObjectListMismatch(String),
    #[error("task \"{task}\" is missing its input \"{input}\"")]
    MissingTaskInput {
        task: String,
        input: String
    },
    #[error("task \"{task}\" references an unusable texture: {error}")]
    UnusableTexture {
        task: String,
        error: TextureError
    },
    #[error("the frame graph has been disposed")]
    Disposed,
    #[error(transparent)]
    Texture(#[from] TextureError)
}

/// Why [`crate::frame_graph::FrameGraph::when_ready_async`] gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadyError {
    #[error("the frame graph was disposed")]
    Disposed,
    #[error("timed out waiting for {pending:?} to become ready")]
    Timeout {
        pending: Vec<String>
    }
}
