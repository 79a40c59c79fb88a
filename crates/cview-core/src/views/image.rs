//! Image viewer
//!
//! Reports format, dimensions, color mode and metadata. Only headers and
//! metadata are read; pixel data is never decoded, and the decoder runs
//! under an allocation limit scaled to the input size.

use crate::error::Result;
use crate::lines::{clip_lines, format_keyvals, Rendered};
use crate::pipeline::Context;
use ::image::{ExtendedColorType, ImageDecoder, ImageFormat, ImageReader, Limits};
use flate2::read::ZlibDecoder;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::debug;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Short name and description for a format
fn describe(format: ImageFormat) -> (String, String) {
    let (name, description) = match format {
        ImageFormat::Png => ("PNG", "Portable network graphics"),
        ImageFormat::Jpeg => ("JPEG", "JPEG (ISO 10918)"),
        ImageFormat::Gif => ("GIF", "Compuserve GIF"),
        ImageFormat::Ico => ("ICO", "Windows Icon"),
        ImageFormat::Bmp => ("BMP", "Windows Bitmap"),
        ImageFormat::WebP => ("WEBP", "WebP image"),
        ImageFormat::Tiff => ("TIFF", "Adobe TIFF"),
        other => {
            let name = format!("{other:?}").to_uppercase();
            return (name.clone(), name);
        }
    };
    (name.to_string(), description.to_string())
}

/// Color mode in the usual short notation (`L`, `RGB`, `RGBA`, ...)
fn mode(color: ExtendedColorType) -> String {
    match color {
        ExtendedColorType::L1 => "1".to_string(),
        ExtendedColorType::L8 => "L".to_string(),
        ExtendedColorType::La8 => "LA".to_string(),
        ExtendedColorType::Rgb8 => "RGB".to_string(),
        ExtendedColorType::Rgba8 => "RGBA".to_string(),
        ExtendedColorType::L16 => "I;16".to_string(),
        ExtendedColorType::La16 => "LA;16".to_string(),
        ExtendedColorType::Rgb16 => "RGB;16".to_string(),
        ExtendedColorType::Rgba16 => "RGBA;16".to_string(),
        ExtendedColorType::Unknown(_) => "P".to_string(),
        other => format!("{other:?}"),
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn split_nul(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let i = data.iter().position(|b| *b == 0)?;
    Some((&data[..i], &data[i + 1..]))
}

fn inflate(data: &[u8], cap: u64) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).take(cap).read_to_end(&mut out).ok()?;
    Some(out)
}

/// Text and physical metadata chunks of a PNG stream
fn png_metadata(content: &[u8], cap: u64, info: &mut BTreeMap<String, String>) {
    let Some(mut rest) = content.strip_prefix(PNG_SIGNATURE) else {
        return;
    };

    while rest.len() >= 12 {
        let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let kind = &rest[4..8];
        let Some(data) = rest.get(8..8 + len) else {
            break;
        };

        match kind {
            b"tEXt" => {
                if let Some((key, text)) = split_nul(data) {
                    info.insert(latin1(key), latin1(text));
                }
            }
            b"zTXt" => {
                if let Some((key, body)) = split_nul(data) {
                    if let Some(text) = body.get(1..).and_then(|z| inflate(z, cap)) {
                        info.insert(latin1(key), latin1(&text));
                    }
                }
            }
            b"iTXt" => {
                // keyword \0 flag method lang \0 translated \0 text
                if let Some((key, body)) = split_nul(data) {
                    if body.len() >= 2 {
                        let compressed = body[0] == 1;
                        let text = split_nul(&body[2..])
                            .and_then(|(_, r)| split_nul(r))
                            .map(|(_, t)| t);
                        let text = match text {
                            Some(t) if compressed => inflate(t, cap),
                            Some(t) => Some(t.to_vec()),
                            None => None,
                        };
                        if let Some(text) = text {
                            let text = String::from_utf8_lossy(&text).into_owned();
                            info.insert(latin1(key), text);
                        }
                    }
                }
            }
            b"gAMA" if data.len() == 4 => {
                let g = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                info.insert("gamma".to_string(), format!("{}", f64::from(g) / 100_000.0));
            }
            b"pHYs" if data.len() == 9 && data[8] == 1 => {
                let x = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                let y = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
                let dpi = |ppm: u32| (f64::from(ppm) * 0.0254).round();
                info.insert("dpi".to_string(), format!("{} x {}", dpi(x), dpi(y)));
            }
            b"IEND" => break,
            _ => {}
        }
        let Some(next) = rest.get(12 + len..) else {
            break;
        };
        rest = next;
    }
}

fn gif_metadata(content: &[u8], info: &mut BTreeMap<String, String>) {
    if let Some(version) = content.get(..6) {
        info.insert("version".to_string(), latin1(version));
    }
}

fn jpeg_metadata(content: &[u8], info: &mut BTreeMap<String, String>) {
    // SOI, then an APP0 segment carrying "JFIF\0" and a two-byte version
    if content.get(2..4) != Some(&[0xFF, 0xE0][..]) || content.get(6..11) != Some(&b"JFIF\0"[..]) {
        return;
    }
    if let Some(v) = content.get(11..13) {
        info.insert("jfif_version".to_string(), format!("{}.{:02}", v[0], v[1]));
    }
}

/// Primary-IFD EXIF fields by tag name
fn exif_fields(content: &[u8]) -> Vec<(String, String)> {
    let Ok(exif) = exif::Reader::new().read_from_container(&mut Cursor::new(content)) else {
        return Vec::new();
    };
    let mut fields: Vec<(String, String)> = exif
        .fields()
        .filter(|f| f.ifd_num == exif::In::PRIMARY)
        .map(|f| (f.tag.to_string(), f.display_value().with_unit(&exif).to_string()))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

/// Describe an image as key/value pairs, with its format name
pub(crate) fn describe_image(
    content: &[u8],
    alloc_floor: u64,
) -> Option<(String, Vec<(String, String)>)> {
    let mut reader = ImageReader::new(Cursor::new(content))
        .with_guessed_format()
        .ok()?;
    let format = reader.format()?;

    let mut limits = Limits::default();
    limits.max_alloc = Some((content.len() as u64).max(alloc_floor));
    reader.limits(limits);

    let mut decoder = match reader.into_decoder() {
        Ok(decoder) => decoder,
        Err(e) => {
            debug!(?format, "Image header rejected: {e}");
            return None;
        }
    };

    let (name, description) = describe(format);
    let (width, height) = decoder.dimensions();
    let mut parts = vec![
        ("Format".to_string(), description),
        ("Size".to_string(), format!("{width} x {height} px")),
        ("Mode".to_string(), mode(decoder.original_color_type())),
    ];

    let mut info = BTreeMap::new();
    match format {
        ImageFormat::Png => png_metadata(content, alloc_floor, &mut info),
        ImageFormat::Gif => gif_metadata(content, &mut info),
        ImageFormat::Jpeg => jpeg_metadata(content, &mut info),
        _ => {}
    }
    if let Ok(Some(icc)) = decoder.icc_profile() {
        info.insert("icc_profile".to_string(), format!("{} bytes", icc.len()));
    }
    parts.extend(info);
    parts.extend(exif_fields(content));

    Some((name, parts))
}

pub(super) fn render(content: &[u8], limit: usize, ctx: &Context) -> Result<Option<Rendered>> {
    let Some((name, parts)) = describe_image(content, ctx.options().image_alloc_floor) else {
        return Ok(None);
    };
    Ok(Some(Rendered::new(
        format!("{name} image"),
        clip_lines(format_keyvals(&parts, ctx.options().key_max_width), limit),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::Line;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = ::image::RgbImage::new(4, 3);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn chunk(kind: &[u8], data: &[u8]) -> Vec<u8> {
        let mut crc = flate2::Crc::new();
        crc.update(kind);
        crc.update(data);
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        out.extend_from_slice(&crc.sum().to_be_bytes());
        out
    }

    /// PNG with extra chunks inserted right after IHDR
    fn png_with(chunks: &[Vec<u8>]) -> Vec<u8> {
        let png = encode(ImageFormat::Png);
        let ihdr_end = PNG_SIGNATURE.len() + 25;
        let mut out = png[..ihdr_end].to_vec();
        for c in chunks {
            out.extend_from_slice(c);
        }
        out.extend_from_slice(&png[ihdr_end..]);
        out
    }

    fn text(r: &Rendered) -> Vec<String> {
        r.lines.iter().map(Line::plain_text).collect()
    }

    #[test]
    fn test_png_summary() {
        let png = png_with(&[chunk(b"tEXt", b"Software\0cview test")]);
        let r = render(&png, 10_000, &Context::default()).unwrap().unwrap();
        assert_eq!(r.kind, "PNG image");
        let lines = text(&r);
        assert!(lines[0].starts_with("Format"));
        assert!(lines[0].ends_with("Portable network graphics"));
        assert!(lines[1].ends_with("4 x 3 px"));
        assert!(lines[2].ends_with("RGB"));
        assert!(lines.iter().any(|l| l.starts_with("Software") && l.ends_with("cview test")));
    }

    #[test]
    fn test_png_metadata_sorted() {
        let png = png_with(&[
            chunk(b"tEXt", b"Title\0t"),
            chunk(b"tEXt", b"Author\0a"),
            chunk(b"gAMA", &45455u32.to_be_bytes()),
        ]);
        let (_, parts) = describe_image(&png, 1 << 20).unwrap();
        let keys: Vec<_> = parts[3..].iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Author", "Title", "gamma"]);
        assert_eq!(parts[5].1, "0.45455");
    }

    #[test]
    fn test_jpeg() {
        let jpg = encode(ImageFormat::Jpeg);
        let r = render(&jpg, 10_000, &Context::default()).unwrap().unwrap();
        assert_eq!(r.kind, "JPEG image");
        assert!(text(&r)[1].ends_with("4 x 3 px"));
    }

    #[test]
    fn test_garbage_declines() {
        let ctx = Context::default();
        assert!(render(b"definitely not an image", 10_000, &ctx).unwrap().is_none());
        assert!(render(b"", 10_000, &ctx).unwrap().is_none());
        // valid signature, truncated header
        assert!(render(&PNG_SIGNATURE[..8], 10_000, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(mode(ExtendedColorType::L1), "1");
        assert_eq!(mode(ExtendedColorType::Rgba8), "RGBA");
        assert_eq!(mode(ExtendedColorType::L16), "I;16");
    }
}
