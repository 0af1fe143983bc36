use std::io::Cursor;

use datamatrix::{DataMatrix, SymbolList};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

pub const MIN_SIZE: u32 = 64;
pub const MAX_SIZE: u32 = 1024;

/// Light modules on each side of a QR symbol.
const QR_QUIET_ZONE: u32 = 4;

/// Light modules around a Data Matrix symbol.
const DATA_MATRIX_QUIET_ZONE: usize = 1;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("Data Matrix encoding failed: {0}")]
    DataMatrix(String),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),

    #[error("{0} output is not available for Data Matrix")]
    Unsupported(&'static str),
}

/// Error-correction level as exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionLevel {
    Low,
    #[default]
    Medium,
    High,
    Highest,
}

impl CorrectionLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Some(CorrectionLevel::Low),
            "medium" | "m" => Some(CorrectionLevel::Medium),
            "high" | "q" => Some(CorrectionLevel::High),
            "highest" | "h" => Some(CorrectionLevel::Highest),
            _ => None,
        }
    }

    fn ec_level(self) -> EcLevel {
        match self {
            CorrectionLevel::Low => EcLevel::L,
            CorrectionLevel::Medium => EcLevel::M,
            CorrectionLevel::High => EcLevel::Q,
            CorrectionLevel::Highest => EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

/// Renders `text` as a QR code.
///
/// PNG modules are whole pixels: the symbol is centered on a `size`×`size`
/// canvas, or returned larger when its modules don't fit in `size` pixels.
/// SVG output is at least `size` wide.
pub fn encode_qr(
    text: &str,
    level: CorrectionLevel,
    size: u32,
    format: OutputFormat,
) -> Result<Vec<u8>, ImageError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), level.ec_level())?;

    match format {
        OutputFormat::Png => {
            let modules = code.width() as u32 + 2 * QR_QUIET_ZONE;
            let scale = module_scale(size, modules);
            let rendered = code
                .render::<Luma<u8>>()
                .module_dimensions(scale, scale)
                .quiet_zone(true)
                .build();
            png_bytes(pad_to(rendered, size))
        }
        OutputFormat::Svg => {
            let svg = code
                .render::<svg::Color>()
                .min_dimensions(size, size)
                .quiet_zone(true)
                .build();
            Ok(svg.into_bytes())
        }
    }
}

/// Renders `text` as a Data Matrix PNG, sized like [`encode_qr`].
pub fn encode_data_matrix(
    text: &str,
    size: u32,
    format: OutputFormat,
) -> Result<Vec<u8>, ImageError> {
    if format != OutputFormat::Png {
        return Err(ImageError::Unsupported(format.extension()));
    }

    let code = DataMatrix::encode(text.as_bytes(), SymbolList::default())
        .map_err(|e| ImageError::DataMatrix(format!("{:?}", e)))?;
    let bitmap = code.bitmap();

    let width = bitmap.width() + 2 * DATA_MATRIX_QUIET_ZONE;
    let height = bitmap.height() + 2 * DATA_MATRIX_QUIET_ZONE;
    let mut modules = ImageBuffer::from_pixel(width as u32, height as u32, Luma([255u8]));
    for (x, y) in bitmap.pixels() {
        modules.put_pixel(
            (x + DATA_MATRIX_QUIET_ZONE) as u32,
            (y + DATA_MATRIX_QUIET_ZONE) as u32,
            Luma([0u8]),
        );
    }

    let scale = module_scale(size, width.max(height) as u32);
    let scaled = imageops::resize(
        &modules,
        width as u32 * scale,
        height as u32 * scale,
        FilterType::Nearest,
    );
    png_bytes(pad_to(scaled, size))
}

/// Whole pixels per module so that `modules` fit in `size`, never below one.
fn module_scale(size: u32, modules: u32) -> u32 {
    (size / modules.max(1)).max(1)
}

/// Centers `img` on a white `size`×`size` canvas. Symbols already larger are returned as is.
fn pad_to(img: GrayImage, size: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width >= size && height >= size {
        return img;
    }
    let canvas_width = width.max(size);
    let canvas_height = height.max(size);
    let mut canvas = ImageBuffer::from_pixel(canvas_width, canvas_height, Luma([255u8]));
    imageops::overlay(
        &mut canvas,
        &img,
        ((canvas_width - width) / 2) as i64,
        ((canvas_height - height) / 2) as i64,
    );
    canvas
}

fn png_bytes(img: GrayImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn png_has_requested_dimensions() {
        let bytes = encode_qr(
            "https://x.io/scan/abc123",
            CorrectionLevel::Medium,
            256,
            OutputFormat::Png,
        )
        .unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (256, 256));
    }

    #[test]
    fn dense_payload_keeps_every_module() {
        let text = format!(
            "BEGIN:VCARD\nVERSION:3.0\nFN:{}\nORG:Acme\nTEL:+15550100\nEND:VCARD",
            "A".repeat(250)
        );
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M).unwrap();
        let modules = code.width() as u32 + 2 * QR_QUIET_ZONE;
        assert!(modules > 64);

        let bytes = encode_qr(&text, CorrectionLevel::Medium, 64, OutputFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (modules, modules));
    }

    #[test]
    fn modules_scale_by_whole_pixels() {
        assert_eq!(module_scale(256, 33), 7);
        assert_eq!(module_scale(64, 69), 1);
        assert_eq!(module_scale(1024, 16), 64);

        let padded = pad_to(ImageBuffer::from_pixel(231, 231, Luma([0u8])), 256);
        assert_eq!(padded.dimensions(), (256, 256));
        assert_eq!(padded.get_pixel(0, 0), &Luma([255u8]));
        assert_eq!(padded.get_pixel(12, 12), &Luma([0u8]));
        assert_eq!(padded.get_pixel(242, 242), &Luma([0u8]));
        assert_eq!(padded.get_pixel(243, 243), &Luma([255u8]));
    }

    #[test]
    fn svg_output_is_markup() {
        let bytes = encode_qr("hello", CorrectionLevel::Low, 128, OutputFormat::Svg).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn oversized_payload_is_an_error() {
        let text = "x".repeat(5000);
        let result = encode_qr(&text, CorrectionLevel::Highest, 256, OutputFormat::Png);
        assert!(matches!(result, Err(ImageError::Qr(_))));
    }

    #[test]
    fn data_matrix_png() {
        let bytes = encode_data_matrix("SKU-991", 200, OutputFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (200, 200));

        assert!(matches!(
            encode_data_matrix("SKU-991", 200, OutputFormat::Svg),
            Err(ImageError::Unsupported("svg"))
        ));
    }

    #[test]
    fn parses_levels_and_formats() {
        assert_eq!(CorrectionLevel::parse("HIGHEST"), Some(CorrectionLevel::Highest));
        assert_eq!(CorrectionLevel::parse("low"), Some(CorrectionLevel::Low));
        assert_eq!(CorrectionLevel::parse("ultra"), None);
        assert_eq!(OutputFormat::parse("SVG"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::parse("gif"), None);
        assert_eq!(OutputFormat::Png.content_type(), "image/png");
    }
}
