use crate::video::assets::prelude::*;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "{} is invalid.", _0)]
    BufferHandleInvalid(BufferHandle),
    #[fail(display = "{} is invalid.", _0)]
    ShaderHandleInvalid(ShaderHandle),
    #[fail(display = "{} is invalid.", _0)]
    SamplerHandleInvalid(SamplerHandle),
    #[fail(display = "{} is invalid.", _0)]
    TextureHandleInvalid(TextureHandle),
    #[fail(display = "{} is invalid.", _0)]
    RenderPassHandleInvalid(RenderPassHandle),
    #[fail(display = "{} is invalid.", _0)]
    RenderPipelineHandleInvalid(RenderPipelineHandle),
    #[fail(display = "Failed to create shader, errors: \n{}.", _0)]
    ShaderCreationFailure(String),
    #[fail(display = "Trying to update immutable buffer.")]
    UpdateImmutableBuffer,
    #[fail(display = "Buffer is a {:?} buffer, expected {:?}.", found, expected)]
    BufferTypeMismatch {
        expected: BufferType,
        found: BufferType,
    },
    #[fail(display = "Too many color attachments.")]
    TooManyColorAttachments,
    #[fail(display = "A render pass has already been started.")]
    PassAlreadyStarted,
    #[fail(display = "There is no render pass to end.")]
    PassNotStarted,
    #[fail(display = "Pipelines could only be bound inside a render pass.")]
    PipelineOutsidePass,
    #[fail(display = "Nothing could be drawn without a bound pipeline.")]
    PipelineNotBound,
    #[fail(display = "Already drawing, imm_begin/imm_end calls can not nest.")]
    AlreadyDrawing,
    #[fail(display = "Vertex data could only be emitted between imm_begin and imm_end.")]
    NotDrawing,
    #[fail(display = "Batched textures require an open texture batch.")]
    NoTextureBatch,
    #[fail(display = "{} can not change once a draw has started.", _0)]
    ShaderLocked(&'static str),
    #[fail(display = "Slot {} is out of range (max {}).", slot, max)]
    InvalidSlot { slot: usize, max: usize },
    #[fail(display = "Vertex capacity of {} exceeded.", capacity)]
    CapacityExceeded { capacity: usize },
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<failure::Error> for Error {
    fn from(err: failure::Error) -> Error {
        Error::Backend(format!("{}", err))
    }
}
