//! Loaded image surfaces.

/// Handle to an image loaded by a renderer backend. The UI only needs the
/// dimensions for layout; pixel data stays inside the backend, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    id: u64,
    name: String,
    width: u32,
    height: u32,
}

impl Surface {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self { id, name: name.into(), width, height }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}
