//! Vertex attribute formats and shader reflection records

/// Data format of a single vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// One 32-bit float
    R32F,
    /// Two 32-bit floats
    RG32F,
    /// Three 32-bit floats
    RGB32F,
    /// Four 32-bit floats
    RGBA32F,
    /// Four 8-bit unsigned integers
    RGBA8,
    /// Four 32-bit unsigned integers
    RGBA32UI,
}

impl Format {
    /// Total size of one attribute of this format, in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::R32F | Self::RGBA8 => 4,
            Self::RG32F => 8,
            Self::RGB32F => 12,
            Self::RGBA32F | Self::RGBA32UI => 16,
        }
    }

    /// Number of components per attribute
    pub const fn component_count(self) -> u32 {
        match self {
            Self::R32F => 1,
            Self::RG32F => 2,
            Self::RGB32F => 3,
            Self::RGBA32F | Self::RGBA8 | Self::RGBA32UI => 4,
        }
    }

    /// Whether the components are 32-bit floats
    pub const fn is_float(self) -> bool {
        matches!(self, Self::R32F | Self::RG32F | Self::RGB32F | Self::RGBA32F)
    }
}

/// One vertex attribute reflected from a compiled shader variant
///
/// The order of attributes in the reflected list is the order the shader
/// declares them in, which the instanced attribute block relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name as declared by the shader
    pub name: String,
    /// Data format
    pub format: Format,
    /// Binding location in the shader interface
    pub location: u32,
    /// Whether integer data is normalized to [0, 1] on fetch
    pub is_normalized: bool,
    /// Whether the attribute advances per instance instead of per vertex
    pub is_instanced: bool,
}

impl VertexAttribute {
    /// Create a per-vertex attribute
    pub fn new(name: impl Into<String>, format: Format, location: u32) -> Self {
        Self {
            name: name.into(),
            format,
            location,
            is_normalized: false,
            is_instanced: false,
        }
    }

    /// Create a per-instance attribute
    pub fn instanced(name: impl Into<String>, format: Format, location: u32) -> Self {
        Self {
            is_instanced: true,
            ..Self::new(name, format, location)
        }
    }
}

/// Reserved name of the first row of the per-instance world matrix.
///
/// Shaders that opt into instancing declare the world matrix as three
/// consecutive vec4 attributes starting with this one.
pub const INST_MAT_WORLD: &str = "a_matWorld0";
