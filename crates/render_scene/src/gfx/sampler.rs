//! Sampler configuration and handles

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// No filtering (disables mip sampling when used as the mip filter)
    None,
    /// Nearest-neighbor filtering
    Point,
    /// Linear filtering
    Linear,
}

/// Texture addressing mode outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Repeat the texture
    Wrap,
    /// Clamp to the edge texel
    Clamp,
    /// Mirror on every repeat
    Mirror,
}

/// Opaque handle to a device-owned sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerHandle(pub u64);

/// Full sampler configuration
///
/// Devices deduplicate samplers by this value, so requesting the same
/// configuration twice yields the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerInfo {
    /// Minification filter
    pub min_filter: Filter,
    /// Magnification filter
    pub mag_filter: Filter,
    /// Filter between mip levels
    pub mip_filter: Filter,
    /// Addressing along U
    pub address_u: AddressMode,
    /// Addressing along V
    pub address_v: AddressMode,
    /// Addressing along W
    pub address_w: AddressMode,
}

impl SamplerInfo {
    /// Linear clamp-to-edge sampler without mip sampling
    pub const fn linear_clamp() -> Self {
        Self {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mip_filter: Filter::None,
            address_u: AddressMode::Clamp,
            address_v: AddressMode::Clamp,
            address_w: AddressMode::Clamp,
        }
    }

    /// Linear clamp-to-edge sampler with linear mip sampling
    pub const fn linear_clamp_mip() -> Self {
        Self {
            mip_filter: Filter::Linear,
            ..Self::linear_clamp()
        }
    }
}
