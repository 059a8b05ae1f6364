//! PNG decoding into the ARGB32 pixmaps StatusNotifier hosts expect

use std::io::Cursor;

use anyhow::{anyhow, Context, Result};

/// Decoded ARGB32 image, big-endian byte order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub argb: Vec<u8>,
}

/// Decode PNG bytes into an ARGB32 pixmap
pub fn decode_argb(bytes: &[u8]) -> Result<Pixmap> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().context("not a PNG image")?;

    let mut buf = vec![
        0;
        reader
            .output_buffer_size()
            .context("PNG has no output buffer size")?
    ];
    let info = reader.next_frame(&mut buf)?;
    let pixels = &buf[..info.buffer_size()];

    let argb: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => pixels
            .chunks_exact(4)
            .flat_map(|p| [p[3], p[0], p[1], p[2]])
            .collect(),
        png::ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|p| [0xFF, p[0], p[1], p[2]])
            .collect(),
        png::ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[1], p[0], p[0], p[0]])
            .collect(),
        png::ColorType::Grayscale => pixels.iter().flat_map(|&g| [0xFF, g, g, g]).collect(),
        other => return Err(anyhow!("unsupported icon color type {:?}", other)),
    };

    Ok(Pixmap {
        width: info.width,
        height: info.height,
        argb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::preset;

    #[test]
    fn test_decodes_builtin_presets() {
        for name in ["kb_light", "kb_dark", "disconnected", "disconnected_dark"] {
            let pixmap = decode_argb(&preset(name).unwrap()).unwrap();
            assert_eq!(pixmap.width, 22, "{name}");
            assert_eq!(pixmap.argb.len(), (pixmap.width * pixmap.height * 4) as usize);
        }
    }

    #[test]
    fn test_rejects_non_png() {
        assert!(decode_argb(b"definitely not a png").is_err());
    }
}
