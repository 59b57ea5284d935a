//! Pure Rust image processing backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Rotate | `image::DynamicImage::rotate90/180/270` |
//! | Flip | `image::DynamicImage::fliph` / `flipv` |
//! | Encode | `image::DynamicImage::save` (format from extension) |
//!
//! Rotation is limited to quarter turns: that is what the `image` crate
//! provides without resampling, and what the bundled CLI needs. Other angles
//! return a `ProcessingFailed` which the pipeline reports as the failing
//! modifier; a backend with free rotation can be injected without touching
//! the pipeline.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::PixelRegion;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Extensions whose decoders and encoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Returns true if the path's extension has a working decoder compiled in.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            PHOTO_CANDIDATES
                .iter()
                .any(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend over the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    type Handle = DynamicImage;

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn get_size(&self, handle: &DynamicImage) -> Dimensions {
        Dimensions {
            width: handle.width(),
            height: handle.height(),
        }
    }

    fn crop(&self, handle: &mut DynamicImage, region: PixelRegion) -> Result<(), BackendError> {
        if region.width == 0 || region.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "crop region {}x{} is empty",
                region.width, region.height
            )));
        }
        let dims = self.get_size(handle);
        if region.left + region.width > dims.width || region.top + region.height > dims.height {
            return Err(BackendError::ProcessingFailed(format!(
                "crop region {}x{}+{}+{} exceeds image bounds {}x{}",
                region.width, region.height, region.left, region.top, dims.width, dims.height
            )));
        }
        *handle = handle.crop_imm(region.left, region.top, region.width, region.height);
        Ok(())
    }

    fn rotate(&self, handle: &mut DynamicImage, angle: i32) -> Result<(), BackendError> {
        match angle.rem_euclid(360) {
            0 => {}
            90 => *handle = handle.rotate90(),
            180 => *handle = handle.rotate180(),
            270 => *handle = handle.rotate270(),
            other => {
                return Err(BackendError::ProcessingFailed(format!(
                    "rotation by {other}° is not supported; this backend rotates in quarter turns"
                )));
            }
        }
        Ok(())
    }

    fn flip(
        &self,
        handle: &mut DynamicImage,
        vertical: bool,
        horizontal: bool,
    ) -> Result<(), BackendError> {
        if vertical {
            *handle = handle.flipv();
        }
        if horizontal {
            *handle = handle.fliph();
        }
        Ok(())
    }

    fn encode(&self, handle: &DynamicImage, output: &Path) -> Result<(), BackendError> {
        handle.save(output).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to encode {}: {}",
                output.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        }))
    }

    #[test]
    fn supported_input_matches_by_extension() {
        assert!(is_supported_input(Path::new("photo.jpg")));
        assert!(is_supported_input(Path::new("photo.JPEG")));
        assert!(is_supported_input(Path::new("photo.webp")));
        assert!(!is_supported_input(Path::new("photo.gif")));
        assert!(!is_supported_input(Path::new("photo")));
    }

    #[test]
    fn crop_shrinks_to_region() {
        let backend = RustBackend::new();
        let mut img = gradient(200, 100);
        backend
            .crop(
                &mut img,
                PixelRegion {
                    left: 20,
                    top: 0,
                    width: 100,
                    height: 100,
                },
            )
            .unwrap();
        assert_eq!(
            backend.get_size(&img),
            Dimensions {
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn crop_out_of_bounds_is_rejected() {
        let backend = RustBackend::new();
        let mut img = gradient(100, 100);
        let err = backend
            .crop(
                &mut img,
                PixelRegion {
                    left: 50,
                    top: 0,
                    width: 60,
                    height: 100,
                },
            )
            .unwrap_err();
        assert!(matches!(err, BackendError::ProcessingFailed(_)));
        // Failed transform leaves the handle untouched
        assert_eq!(backend.get_size(&img).width, 100);
    }

    #[test]
    fn empty_crop_is_rejected() {
        let backend = RustBackend::new();
        let mut img = gradient(100, 100);
        let region = PixelRegion {
            left: 0,
            top: 0,
            width: 0,
            height: 50,
        };
        assert!(backend.crop(&mut img, region).is_err());
    }

    #[test]
    fn quarter_rotations_swap_dimensions() {
        let backend = RustBackend::new();
        let mut img = gradient(200, 100);
        backend.rotate(&mut img, 90).unwrap();
        assert_eq!(
            backend.get_size(&img),
            Dimensions {
                width: 100,
                height: 200
            }
        );
        backend.rotate(&mut img, 270).unwrap();
        assert_eq!(backend.get_size(&img).width, 200);
    }

    #[test]
    fn negative_quarter_rotation_is_normalized() {
        let backend = RustBackend::new();
        let mut img = gradient(200, 100);
        backend.rotate(&mut img, -90).unwrap();
        assert_eq!(backend.get_size(&img).height, 200);
    }

    #[test]
    fn arbitrary_angle_is_rejected_without_mutating() {
        let backend = RustBackend::new();
        let mut img = gradient(200, 100);
        assert!(backend.rotate(&mut img, 45).is_err());
        assert_eq!(backend.get_size(&img).width, 200);
    }

    #[test]
    fn flip_preserves_dimensions_and_mirrors_pixels() {
        let backend = RustBackend::new();
        let mut img = gradient(4, 4);
        let top_left = img.to_rgba8().get_pixel(0, 0).0;
        backend.flip(&mut img, false, true).unwrap();
        assert_eq!(backend.get_size(&img).width, 4);
        assert_eq!(img.to_rgba8().get_pixel(3, 0).0, top_left);
    }

    #[test]
    fn double_flip_restores_pixels() {
        let backend = RustBackend::new();
        let original = gradient(8, 6);
        let mut img = original.clone();
        backend.flip(&mut img, true, false).unwrap();
        backend.flip(&mut img, true, false).unwrap();
        assert_eq!(img.to_rgba8(), original.to_rgba8());
    }
}
