//! Linear GPU memory holding vertices, indices or uniform blocks.

impl_handle!(BufferHandle);

backend_enum! {
    /// What the buffer is bound as.
    pub enum BufferType {
        Vertex,
        Element,
        Uniform,
    }
}

backend_enum! {
    /// Hint abouts the intended update strategy of the data.
    pub enum BufferUsage {
        /// The data is written once at creation and never changes.
        Static,
        /// The data is updated occasionally.
        Dynamic,
        /// The data is updated every time it is drawn.
        Stream,
    }
}

backend_enum! {
    /// Index format of element buffers.
    pub enum ElementType {
        UnsignedShort,
        UnsignedInt,
    }
}

impl ElementType {
    #[inline]
    pub fn stride(self) -> usize {
        match self {
            ElementType::UnsignedShort => 2,
            ElementType::UnsignedInt => 4,
        }
    }
}

/// The parameters of a buffer object.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferParams {
    pub typ: BufferType,
    pub usage: BufferUsage,
    /// Initial capacity in bytes.
    pub size: usize,
}

impl BufferParams {
    #[inline]
    pub fn new(typ: BufferType, usage: BufferUsage, size: usize) -> Self {
        BufferParams { typ, usage, size }
    }

    #[inline]
    pub fn vertex(usage: BufferUsage, size: usize) -> Self {
        BufferParams::new(BufferType::Vertex, usage, size)
    }

    #[inline]
    pub fn element(usage: BufferUsage, size: usize) -> Self {
        BufferParams::new(BufferType::Element, usage, size)
    }

    #[inline]
    pub fn uniform(usage: BufferUsage, size: usize) -> Self {
        BufferParams::new(BufferType::Uniform, usage, size)
    }

    /// Static buffers could not be updated after creation.
    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.usage != BufferUsage::Static
    }
}
