//! Export pipeline.
//!
//! Composes the current buffer with the active crop selection and resize
//! target into a new encoded file. Export is a pure read: committed state is
//! never touched.

use serde::{Deserialize, Serialize};
use tracing::{debug_span, info};

use crate::buffer::{ImageBuffer, NaturalDimensions};
use crate::config::FALLBACK_FILE_STEM;
use crate::decode::{resize, FilterType};
use crate::encode::ExportFormat;
use crate::error::{EditError, Result};
use crate::transform::{apply_crop, PixelRect};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Fraction in `(0, 1]`; the configured default when absent. Ignored by
    /// lossless formats but still validated.
    pub quality: Option<f32>,
    /// File name or stem. The format's extension is appended unless already
    /// present. Derived from the source name when absent or blank.
    pub file_name: Option<String>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub mime: &'static str,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Source rectangle and output size of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPlan {
    pub source: PixelRect,
    pub output: NaturalDimensions,
}

impl ExportPlan {
    /// Source: the crop rectangle clipped to the image, or the full frame.
    /// Output: the resize target when given, else the source size.
    pub fn new(
        natural: NaturalDimensions,
        crop: Option<PixelRect>,
        resize_target: Option<(u32, u32)>,
    ) -> Self {
        let full = PixelRect::full(natural.width, natural.height);
        let source = crop
            .and_then(|rect| rect.clip(natural.width, natural.height))
            .unwrap_or(full);
        let output = match resize_target {
            Some((width, height)) if width > 0 && height > 0 => {
                NaturalDimensions::new(width, height)
            }
            _ => NaturalDimensions::new(source.width, source.height),
        };
        Self { source, output }
    }

    pub fn is_identity(&self, natural: NaturalDimensions) -> bool {
        self.source == PixelRect::full(natural.width, natural.height)
            && self.output == natural
    }
}

/// Validate an export quality, falling back to `default` when absent.
pub fn resolve_quality(quality: Option<f32>, default: f32) -> Result<f32> {
    let quality = quality.unwrap_or(default);
    if quality.is_finite() && quality > 0.0 && quality <= 1.0 {
        Ok(quality)
    } else {
        Err(EditError::invalid(format!(
            "export quality {quality} must be in (0, 1]"
        )))
    }
}

/// `<stem>.<ext>` where the stem is everything before the first dot of the
/// source name, or `imagen` when there is none.
pub fn suggested_file_name(source_name: Option<&str>, format: ExportFormat) -> String {
    let stem = source_name
        .and_then(|name| name.trim().split('.').next())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_FILE_STEM);
    format!("{stem}.{}", format.extension())
}

fn resolve_file_name(
    requested: Option<&str>,
    source_name: Option<&str>,
    format: ExportFormat,
) -> String {
    match requested.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => {
            let ext = format!(".{}", format.extension());
            if name.to_ascii_lowercase().ends_with(&ext) {
                name.to_string()
            } else {
                format!("{name}{ext}")
            }
        }
        None => suggested_file_name(source_name, format),
    }
}

/// Produce an encoded file from `buffer`.
pub fn export_image(
    buffer: &ImageBuffer,
    plan: ExportPlan,
    request: &ExportRequest,
    default_quality: f32,
    source_name: Option<&str>,
) -> Result<ExportResult> {
    let quality = resolve_quality(request.quality, default_quality)?;
    let format = request.format;
    let _span = debug_span!("export", %format, width = plan.output.width, height = plan.output.height)
        .entered();

    let image = buffer.decode()?;
    let image = apply_crop(&image, plan.source)?;
    let image = resize(&image, plan.output.width, plan.output.height, FilterType::Lanczos3)?;
    let bytes = format.encode(&image, quality)?;

    let file_name = resolve_file_name(request.file_name.as_deref(), source_name, format);
    info!(
        %format,
        quality,
        width = image.width,
        height = image.height,
        bytes = bytes.len(),
        file_name = %file_name,
        "image exported"
    );

    Ok(ExportResult {
        bytes,
        format,
        mime: format.mime_type(),
        file_name,
        width: image.width,
        height: image.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;
    use crate::encode::encode_png;

    fn buffer(width: u32, height: u32) -> ImageBuffer {
        let pixels: Vec<u8> = (0..width * height)
            .flat_map(|i| [(i % width) as u8, (i / width) as u8, 0, 255])
            .collect();
        ImageBuffer::from_source(encode_png(&pixels, width, height).unwrap(), "image/png").unwrap()
    }

    #[test]
    fn test_plan_crop_left_half() {
        let natural = NaturalDimensions::new(800, 600);
        let crop = PixelRect {
            x: 0,
            y: 0,
            width: 400,
            height: 600,
        };
        let plan = ExportPlan::new(natural, Some(crop), None);
        assert_eq!(plan.output, NaturalDimensions::new(400, 600));
    }

    #[test]
    fn test_plan_resize_wins_and_crop_clipped() {
        let natural = NaturalDimensions::new(100, 100);
        let crop = PixelRect {
            x: 80,
            y: 0,
            width: 50,
            height: 10,
        };
        let plan = ExportPlan::new(natural, Some(crop), Some((30, 30)));
        assert_eq!(plan.source.width, 20);
        assert_eq!(plan.output, NaturalDimensions::new(30, 30));

        let plan = ExportPlan::new(natural, None, Some((0, 30)));
        assert!(plan.is_identity(natural));
    }

    #[test]
    fn test_export_png_with_crop() {
        let buf = buffer(20, 10);
        let plan = ExportPlan::new(
            buf.natural(),
            Some(PixelRect {
                x: 5,
                y: 2,
                width: 10,
                height: 6,
            }),
            None,
        );
        let result =
            export_image(&buf, plan, &ExportRequest::new(ExportFormat::Png), 0.92, Some("foto.png"))
                .unwrap();

        assert_eq!((result.width, result.height), (10, 6));
        assert_eq!(result.mime, "image/png");
        assert_eq!(result.file_name, "foto.png");

        let decoded = decode_image(&result.bytes, None).unwrap();
        assert_eq!(decoded.pixel(0, 0), [5, 2, 0, 255]);
    }

    #[test]
    fn test_export_jpeg_and_webp() {
        let buf = buffer(16, 16);
        let plan = ExportPlan::new(buf.natural(), None, Some((8, 8)));

        let jpeg = export_image(
            &buf,
            plan,
            &ExportRequest::new(ExportFormat::Jpeg).with_quality(0.5),
            0.92,
            None,
        )
        .unwrap();
        assert_eq!(&jpeg.bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(jpeg.file_name, "imagen.jpg");
        assert_eq!((jpeg.width, jpeg.height), (8, 8));

        let webp = export_image(
            &buf,
            plan,
            &ExportRequest::new(ExportFormat::WebP).with_file_name("salida"),
            0.92,
            None,
        )
        .unwrap();
        assert_eq!(webp.mime, "image/webp");
        assert_eq!(webp.file_name, "salida.webp");
    }

    #[test]
    fn test_bad_quality_rejected() {
        let buf = buffer(2, 2);
        let plan = ExportPlan::new(buf.natural(), None, None);
        for q in [0.0, -0.5, 1.01, f32::NAN] {
            let request = ExportRequest::new(ExportFormat::Jpeg).with_quality(q);
            assert!(matches!(
                export_image(&buf, plan, &request, 0.92, None),
                Err(EditError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(
            suggested_file_name(Some("vacaciones.2024.jpeg"), ExportFormat::Png),
            "vacaciones.png"
        );
        assert_eq!(suggested_file_name(Some(".hidden"), ExportFormat::Jpeg), "imagen.jpg");
        assert_eq!(suggested_file_name(None, ExportFormat::WebP), "imagen.webp");
    }

    #[test]
    fn test_explicit_name_keeps_extension() {
        assert_eq!(
            resolve_file_name(Some("final.JPG"), Some("a.png"), ExportFormat::Jpeg),
            "final.JPG"
        );
        assert_eq!(
            resolve_file_name(Some("   "), Some("a.png"), ExportFormat::Jpeg),
            "a.jpg"
        );
    }
}
