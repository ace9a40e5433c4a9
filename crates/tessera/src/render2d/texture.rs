//! # Texture — Path-Keyed GPU Textures
//!
//! Users never hold a `wgpu::Texture` directly. [`TextureCache::get`]
//! returns a [`Texture`]: a copyable [`TextureHandle`] plus the image size.
//! The cache owns the GPU-side resources and keys them by path, so asking
//! for the same file twice returns the same handle without decoding or
//! uploading again.
//!
//! ```text
//! TextureCache<R>
//! ┌───────────────────────────────────────────────┐
//! │ entries: Vec<TextureEntry<R>>                 │
//! │   [0] "player.png"   ◄── TextureHandle(1)     │
//! │   [1] "tileset.png"  ◄── TextureHandle(2)     │
//! │                                               │
//! │ path_cache: HashMap<String, TextureHandle>    │
//! │   "player.png"  → Handle(1)                   │
//! │   "tileset.png" → Handle(2)                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Handles start at 1. Zero is never issued, so a zeroed handle can't alias a
//! real texture. Entries live as long as the cache; there is no eviction.
//!
//! ## Collaborators
//!
//! Loading is split across two seams so the cache itself stays free of I/O
//! and GPU calls:
//!
//! - [`ImageDecoder`] turns a path into RGBA8 pixels. [`FileDecoder`] reads
//!   from disk with the `image` crate.
//! - [`TextureUploader`] turns pixels into a GPU resource. The wgpu
//!   implementation, [`GpuTextureUploader`], creates the texture and the bind
//!   group the sprite shader samples through.
//!
//! Errors from either are passed through unchanged.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::pipeline::SpriteRenderer;
use crate::error::RenderError;
use crate::render::GpuContext;

/// Handle to a texture in a [`TextureCache`].
///
/// Ordering is by load order; [`SortMode::Texture`](super::SortMode::Texture)
/// sorts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A loaded texture: its handle and pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Turns a path into pixels.
pub trait ImageDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, RenderError>;
}

/// Turns pixels into a GPU resource of type `Resource`.
pub trait TextureUploader {
    type Resource;

    fn upload(&mut self, label: &str, image: &DecodedImage) -> Result<Self::Resource, RenderError>;
}

/// Decodes PNG and JPEG files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&mut self, path: &str) -> Result<DecodedImage, RenderError> {
        let img = image::open(path)
            .map_err(|source| RenderError::ImageDecode {
                path: path.to_owned(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(DecodedImage {
            width,
            height,
            pixels: img.into_raw(),
        })
    }
}

struct TextureEntry<R> {
    resource: R,
    width: u32,
    height: u32,
}

/// Path-keyed texture store. `R` is whatever the uploader produces.
pub struct TextureCache<R> {
    entries: Vec<TextureEntry<R>>,
    path_cache: HashMap<String, TextureHandle>,
}

impl<R> TextureCache<R> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            path_cache: HashMap::new(),
        }
    }

    /// Return the texture for `path`, loading it on first request.
    pub fn get<D, U>(
        &mut self,
        path: &str,
        decoder: &mut D,
        uploader: &mut U,
    ) -> Result<Texture, RenderError>
    where
        D: ImageDecoder + ?Sized,
        U: TextureUploader<Resource = R> + ?Sized,
    {
        if let Some(&handle) = self.path_cache.get(path) {
            log::debug!("texture cache hit: {path}");
            return Ok(self.describe(handle));
        }

        let image = decoder.decode(path)?;
        let resource = uploader.upload(path, &image)?;

        let handle = TextureHandle(self.entries.len() as u32 + 1);
        self.entries.push(TextureEntry {
            resource,
            width: image.width,
            height: image.height,
        });
        self.path_cache.insert(path.to_owned(), handle);

        log::info!(
            "loaded texture '{path}' ({}x{}) as handle {}",
            image.width,
            image.height,
            handle.0
        );
        Ok(self.describe(handle))
    }

    /// The GPU resource behind a handle.
    pub fn resource(&self, handle: TextureHandle) -> Option<&R> {
        self.entry(handle).map(|entry| &entry.resource)
    }

    /// Size and handle for a texture previously returned by [`get`](Self::get).
    pub fn texture(&self, handle: TextureHandle) -> Option<Texture> {
        self.entry(handle).map(|_| self.describe(handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, handle: TextureHandle) -> Option<&TextureEntry<R>> {
        let index = handle.0.checked_sub(1)? as usize;
        self.entries.get(index)
    }

    fn describe(&self, handle: TextureHandle) -> Texture {
        let entry = &self.entries[handle.0 as usize - 1];
        Texture {
            handle,
            width: entry.width,
            height: entry.height,
        }
    }
}

impl<R> Default for TextureCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A texture on the GPU, ready to bind at group 1 of the sprite pipeline.
pub struct GpuTexture {
    pub bind_group: wgpu::BindGroup,
}

/// Uploads decoded images as sampled wgpu textures.
pub struct GpuTextureUploader<'a> {
    pub gpu: &'a GpuContext,
    pub renderer: &'a SpriteRenderer,
}

impl TextureUploader for GpuTextureUploader<'_> {
    type Resource = GpuTexture;

    fn upload(&mut self, label: &str, image: &DecodedImage) -> Result<GpuTexture, RenderError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            return Err(RenderError::TextureUpload {
                label: label.to_owned(),
                reason: format!(
                    "{}x{} image with {} bytes of RGBA8 data",
                    image.width,
                    image.height,
                    image.pixels.len()
                ),
            });
        }

        let texture = self.gpu.device.create_texture_with_data(
            &self.gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.renderer.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.renderer.sampler),
                },
            ],
        });

        Ok(GpuTexture { bind_group })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves 2x2 images for any path except those starting with "missing".
    #[derive(Default)]
    struct FakeDecoder {
        calls: Vec<String>,
    }

    impl ImageDecoder for FakeDecoder {
        fn decode(&mut self, path: &str) -> Result<DecodedImage, RenderError> {
            self.calls.push(path.to_owned());
            if path.starts_with("missing") {
                return Err(RenderError::ImageDecode {
                    path: path.to_owned(),
                    source: image::ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no such file",
                    )),
                });
            }
            Ok(DecodedImage {
                width: 2,
                height: 2,
                pixels: vec![255; 16],
            })
        }
    }

    /// Hands out sequential resource ids.
    #[derive(Default)]
    struct FakeUploader {
        uploaded: Vec<String>,
    }

    impl TextureUploader for FakeUploader {
        type Resource = usize;

        fn upload(&mut self, label: &str, _image: &DecodedImage) -> Result<usize, RenderError> {
            self.uploaded.push(label.to_owned());
            Ok(self.uploaded.len() * 100)
        }
    }

    #[test]
    fn second_get_is_served_from_cache() {
        let mut cache = TextureCache::new();
        let mut decoder = FakeDecoder::default();
        let mut uploader = FakeUploader::default();

        let first = cache.get("player.png", &mut decoder, &mut uploader).unwrap();
        let second = cache.get("player.png", &mut decoder, &mut uploader).unwrap();

        assert_eq!(first, second);
        assert_eq!(decoder.calls, vec!["player.png"]);
        assert_eq!(uploader.uploaded.len(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resource(first.handle), Some(&100));
    }

    #[test]
    fn distinct_paths_get_distinct_handles() {
        let mut cache = TextureCache::new();
        let mut decoder = FakeDecoder::default();
        let mut uploader = FakeUploader::default();

        let a = cache.get("a.png", &mut decoder, &mut uploader).unwrap();
        let b = cache.get("b.png", &mut decoder, &mut uploader).unwrap();

        assert_eq!(a.handle, TextureHandle(1));
        assert_eq!(b.handle, TextureHandle(2));
        assert!(b.handle > a.handle);
        assert_eq!((a.width, a.height), (2, 2));
        assert_eq!(cache.resource(b.handle), Some(&200));
    }

    #[test]
    fn decode_failure_propagates_and_caches_nothing() {
        let mut cache = TextureCache::new();
        let mut decoder = FakeDecoder::default();
        let mut uploader = FakeUploader::default();

        let err = cache
            .get("missing.png", &mut decoder, &mut uploader)
            .unwrap_err();
        assert!(matches!(err, RenderError::ImageDecode { ref path, .. } if path == "missing.png"));
        assert!(cache.is_empty());
        assert!(uploader.uploaded.is_empty());

        // A failed load is retried on the next request.
        let _ = cache.get("missing.png", &mut decoder, &mut uploader);
        assert_eq!(decoder.calls.len(), 2);
    }

    #[test]
    fn unknown_handles_resolve_to_none() {
        let cache: TextureCache<usize> = TextureCache::new();
        assert!(cache.resource(TextureHandle(0)).is_none());
        assert!(cache.resource(TextureHandle(7)).is_none());
        assert!(cache.texture(TextureHandle(1)).is_none());
    }

    #[test]
    fn independent_caches_do_not_share_entries() {
        let mut decoder = FakeDecoder::default();
        let mut uploader = FakeUploader::default();
        let mut first = TextureCache::new();
        let mut second = TextureCache::new();

        first.get("a.png", &mut decoder, &mut uploader).unwrap();
        second.get("a.png", &mut decoder, &mut uploader).unwrap();

        assert_eq!(decoder.calls.len(), 2);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn file_decoder_reports_missing_files() {
        let err = FileDecoder
            .decode("definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, RenderError::ImageDecode { .. }));
    }

    #[test]
    fn file_decoder_reads_png() {
        let path = std::env::temp_dir().join(format!("tessera-decode-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let decoded = FileDecoder.decode(path.to_str().unwrap()).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);
    }
}
