//! Cache configuration.

use crate::backend::{AddressMode, FilterMode, TextureDescriptor, TextureFormat};

/// Sampling and upload settings applied to every cached texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSettings {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// Wrap mode for both axes
    pub address_mode: AddressMode,
    pub generate_mipmaps: bool,
    /// Upload format forced on every texture; `None` keeps the pixel data's own
    pub format: Option<TextureFormat>,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::LinearMipmapLinear,
            mag_filter: FilterMode::Linear,
            address_mode: AddressMode::Repeat,
            generate_mipmaps: true,
            format: None,
        }
    }
}

impl TextureSettings {
    pub fn with_filters(mut self, min_filter: FilterMode, mag_filter: FilterMode) -> Self {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        self
    }

    pub fn with_address_mode(mut self, address_mode: AddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }

    pub fn with_mipmaps(mut self, generate_mipmaps: bool) -> Self {
        self.generate_mipmaps = generate_mipmaps;
        self
    }

    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Texture descriptor for an image of the given size and pixel format.
    pub fn descriptor(
        &self,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> TextureDescriptor {
        TextureDescriptor {
            label: Some(label.to_string()),
            width,
            height,
            format: self.format.unwrap_or(format),
            min_filter: self.min_filter,
            mag_filter: self.mag_filter,
            address_mode_u: self.address_mode,
            address_mode_v: self.address_mode,
            generate_mipmaps: self.generate_mipmaps,
        }
    }
}

/// Graphics cache configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub texture: TextureSettings,
    /// Instances each dynamic per-instance buffer is initially sized for
    pub instance_capacity: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            texture: TextureSettings::default(),
            instance_capacity: 64,
        }
    }
}

impl CacheConfig {
    pub fn with_texture_settings(mut self, texture: TextureSettings) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_instance_capacity(mut self, capacity: u32) -> Self {
        self.instance_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texture_settings() {
        let desc =
            TextureSettings::default().descriptor("tex.png", 4, 2, TextureFormat::Rgba8Unorm);
        assert_eq!(desc.label.as_deref(), Some("tex.png"));
        assert_eq!((desc.width, desc.height), (4, 2));
        assert_eq!(desc.min_filter, FilterMode::LinearMipmapLinear);
        assert_eq!(desc.mag_filter, FilterMode::Linear);
        assert_eq!(desc.address_mode_u, AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, AddressMode::Repeat);
        assert!(desc.generate_mipmaps);
        assert_eq!(desc.data_size(), 32);
    }

    #[test]
    fn test_format_follows_pixels_unless_forced() {
        let settings = TextureSettings::default();
        let desc = settings.descriptor("mask.png", 2, 2, TextureFormat::R8Unorm);
        assert_eq!(desc.format, TextureFormat::R8Unorm);
        assert_eq!(desc.data_size(), 4);

        let forced = settings.with_format(TextureFormat::Rgba8Unorm);
        let desc = forced.descriptor("mask.png", 2, 2, TextureFormat::R8Unorm);
        assert_eq!(desc.format, TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::default()
            .with_instance_capacity(8)
            .with_texture_settings(
                TextureSettings::default()
                    .with_filters(FilterMode::Nearest, FilterMode::Nearest)
                    .with_mipmaps(false),
            );
        assert_eq!(config.instance_capacity, 8);
        assert_eq!(config.texture.min_filter, FilterMode::Nearest);
        assert!(!config.texture.generate_mipmaps);
    }
}
