//! Texture handles and built-in fallback resources

/// Opaque handle to a device-owned texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// GPU texture reference carrying the metadata binding decisions need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    /// Device handle
    pub handle: TextureHandle,
    /// Number of mip levels (at least 1)
    pub mip_levels: u32,
}

impl Texture {
    /// Create a texture reference
    pub fn new(handle: TextureHandle, mip_levels: u32) -> Self {
        Self { handle, mip_levels }
    }

    /// Whether the texture carries more than the base mip level
    pub fn has_mip_chain(&self) -> bool {
        self.mip_levels > 1
    }
}

/// Engine-provided fallback resources, created once at startup
///
/// Models bind `empty_texture` wherever an optional texture slot (such as
/// a lightmap) has nothing assigned, so shaders never sample an unbound
/// slot.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinResources {
    /// 1x1 transparent placeholder texture
    pub empty_texture: Texture,
}

impl BuiltinResources {
    /// Bundle the built-in resources
    pub fn new(empty_texture: Texture) -> Self {
        Self { empty_texture }
    }
}
