//! Hex dump viewer

use crate::lines::{append_trailer, Line, Rendered, StyleTag};

const ROW: usize = 16;

/// Split `data` into `(offset, hex, ascii)` rows of 16 bytes
///
/// Short final rows are padded so the ASCII column stays aligned.
pub(crate) fn hexdump(data: &[u8]) -> Vec<(String, String, String)> {
    data.chunks(ROW)
        .enumerate()
        .map(|(i, part)| {
            let encoded = ::hex::encode(part);
            let mut hexa = encoded
                .as_bytes()
                .chunks(2)
                .map(|pair| std::str::from_utf8(pair).unwrap_or(".."))
                .collect::<Vec<_>>()
                .join(" ");
            if part.len() < ROW {
                hexa.push(' ');
                hexa.push_str(&vec!["  "; ROW - part.len()].join(" "));
            }
            let ascii = part
                .iter()
                .map(|&b| if (32..127).contains(&b) { b as char } else { '.' })
                .collect();
            (format!("{:010x}", i * ROW), hexa, ascii)
        })
        .collect()
}

pub(super) fn render(content: &[u8], limit: usize) -> Rendered {
    let shown = &content[..content.len().min(limit)];
    let mut lines: Vec<Line> = hexdump(shown)
        .into_iter()
        .map(|(offset, hexa, ascii)| {
            Line::new()
                .with(StyleTag::Offset, offset)
                .with(StyleTag::Plain, " ")
                .with(StyleTag::Text, hexa)
                .with(StyleTag::Plain, "   ")
                .with(StyleTag::Text, ascii)
        })
        .collect();
    append_trailer(content.len(), limit, &mut lines);
    Rendered::new("Hex", lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexdump_full_row() {
        let rows = hexdump(b"0123456789abcdef");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "0000000000");
        assert!(rows[0].1.starts_with("30 31 32"));
        assert_eq!(rows[0].2, "0123456789abcdef");
    }

    #[test]
    fn test_hexdump_short_row_is_padded() {
        let full = hexdump(&[0u8; 16]);
        let short = hexdump(b"\x00A");
        assert_eq!(short[0].1.len(), full[0].1.len());
        assert_eq!(short[0].2, ".A");
    }

    #[test]
    fn test_second_row_offset() {
        let rows = hexdump(&[0xffu8; 20]);
        assert_eq!(rows[1].0, "0000000010");
    }

    #[test]
    fn test_hex_trailer_accounting() {
        let r = render(&[1u8; 40], 32);
        assert_eq!(r.kind, "Hex");
        // two rows, blank line, trailer
        assert_eq!(r.lines.len(), 4);
        assert!(r.lines[3].plain_text().contains("8B of data not shown"));
    }
}
