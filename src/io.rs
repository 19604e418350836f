// ============================================================================
// IMAGE I/O — decode sources, encode results
// ============================================================================
//
// The engine only ever sees RGBA8 buffers; this module is the boundary where
// files become buffers and buffers become encoded bytes. Encoding is
// writer-generic so the same path serves files (`encode_and_write`) and
// in-memory export (`encode_to_vec`).
// ============================================================================

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};

use crate::error::{FilterError, Result};
use crate::ops::adjustments::check_dims;

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tga,
    Tiff,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Webp => "webp",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
            SaveFormat::Tiff => "tiff",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "webp" => Some(SaveFormat::Webp),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            "tiff" | "tif" => Some(SaveFormat::Tiff),
            _ => None,
        }
    }
}

/// TIFF compression mode, passed straight to the `tiff` encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    #[default]
    None,
    Lzw,
    Deflate,
}

/// Choose the [`SaveFormat`] from a `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is known.
pub fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> SaveFormat {
    if let Some(f) = format_arg {
        return SaveFormat::from_extension(f).unwrap_or(SaveFormat::Png);
    }
    if let Some(out) = output {
        let ext = out.extension().and_then(|e| e.to_str()).unwrap_or("");
        return SaveFormat::from_extension(ext).unwrap_or(SaveFormat::Png);
    }
    SaveFormat::Png
}

/// Decode an image file into an RGBA8 buffer.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)?.to_rgba8();
    check_dims(&img)?;
    Ok(img)
}

/// Encode into any `Write + Seek` sink.
fn encode<W: Write + Seek>(
    image: &RgbaImage,
    mut writer: W,
    format: SaveFormat,
    quality: u8,
    tiff_compression: TiffCompression,
) -> Result<()> {
    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality).write_image(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                ColorType::Rgb8,
            )?;
        }
        SaveFormat::Webp => {
            let dyn_img = DynamicImage::ImageRgba8(image.clone());
            dyn_img.write_to(&mut writer, image::ImageOutputFormat::WebP)?;
        }
        SaveFormat::Bmp => {
            BmpEncoder::new(&mut writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ColorType::Rgba8,
            )?;
        }
        SaveFormat::Tga => {
            TgaEncoder::new(&mut writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ColorType::Rgba8,
            )?;
        }
        SaveFormat::Tiff => {
            let err_map = |e: tiff::TiffError| {
                FilterError::Io(std::io::Error::other(format!("TIFF encode error: {}", e)))
            };
            let mut tiff_enc = tiff::encoder::TiffEncoder::new(&mut writer).map_err(err_map)?;
            match tiff_compression {
                TiffCompression::None => {
                    tiff_enc
                        .write_image::<tiff::encoder::colortype::RGBA8>(
                            image.width(),
                            image.height(),
                            image.as_raw(),
                        )
                        .map_err(err_map)?;
                }
                TiffCompression::Lzw => {
                    tiff_enc
                        .write_image_with_compression::<tiff::encoder::colortype::RGBA8, _>(
                            image.width(),
                            image.height(),
                            tiff::encoder::compression::Lzw,
                            image.as_raw(),
                        )
                        .map_err(err_map)?;
                }
                TiffCompression::Deflate => {
                    tiff_enc
                        .write_image_with_compression::<tiff::encoder::colortype::RGBA8, _>(
                            image.width(),
                            image.height(),
                            tiff::encoder::compression::Deflate::default(),
                            image.as_raw(),
                        )
                        .map_err(err_map)?;
                }
            }
        }
    }
    Ok(())
}

/// Encode and write an image to a file.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
    tiff_compression: TiffCompression,
) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode(image, &mut writer, format, quality, tiff_compression)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into an in-memory byte vector (download/export paths).
pub fn encode_to_vec(image: &RgbaImage, format: SaveFormat, quality: u8) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    encode(image, &mut cursor, format, quality, TiffCompression::default())?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testutil::checker_image;

    #[test]
    fn format_from_extension() {
        assert_eq!(SaveFormat::from_extension("JPEG"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_extension("tif"), Some(SaveFormat::Tiff));
        assert_eq!(SaveFormat::from_extension("xyz"), None);

        assert_eq!(
            parse_format(Some("webp"), None),
            SaveFormat::Webp,
        );
        assert_eq!(
            parse_format(None, Some(Path::new("out/result.PNG"))),
            SaveFormat::Png,
        );
        assert_eq!(parse_format(None, None), SaveFormat::Png);
    }

    #[test]
    fn png_export_round_trips_losslessly() {
        let img = checker_image(10, 7);
        let bytes = encode_to_vec(&img, SaveFormat::Png, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (10, 7));
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn jpeg_export_produces_decodable_bytes() {
        let img = checker_image(16, 16);
        let bytes = encode_to_vec(&img, SaveFormat::Jpeg, 85).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }
}
