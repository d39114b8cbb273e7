//! Shader variant reflection and macro patches
//!
//! Shader compilation and variant selection happen in the shader system;
//! this module only carries the reflected interface the update core needs.

use super::format::VertexAttribute;

/// Boolean preprocessor switch applied when selecting a shader variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroPatch {
    /// Macro name
    pub name: &'static str,
    /// Macro value
    pub value: bool,
}

/// Reflection data for one compiled shader variant
#[derive(Debug, Clone, Default)]
pub struct ShaderVariant {
    /// Vertex attributes in shader declaration order
    pub attributes: Vec<VertexAttribute>,
}

impl ShaderVariant {
    /// Create a variant from its reflected attribute list
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }
}
