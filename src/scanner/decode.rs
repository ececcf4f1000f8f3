//! QR decoding primitives over raw grayscale buffers.
//!
//! Camera frames and gallery images both funnel through these helpers so the
//! two scan paths cannot drift apart.

/// ITU-R 601 luma conversion of a tightly packed RGB buffer.
pub(crate) fn luma_from_rgb(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = Vec::with_capacity(width * height);
    for chunk in rgb.chunks(3) {
        if chunk.len() == 3 {
            let luma =
                (chunk[0] as u32 * 299 + chunk[1] as u32 * 587 + chunk[2] as u32 * 114) / 1000;
            gray.push(luma as u8);
        }
    }
    gray
}

/// Decode the first readable QR grid in a grayscale buffer.
pub(crate) fn decode_grayscale(gray: &[u8], width: usize, height: usize) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        gray.get(y * width + x).copied().unwrap_or(0)
    });

    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_meta, content)) => return Some(content),
            // Detected but unreadable grids are a normal condition (partial
            // frame, motion blur); keep trying the remaining grids.
            Err(_) => continue,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_conversion_weights_channels() {
        // Pure red, green, blue, white pixels
        let rgb = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = luma_from_rgb(&rgb, 4, 1);
        assert_eq!(gray, vec![76, 149, 29, 255]);
    }

    #[test]
    fn luma_ignores_trailing_partial_chunk() {
        let rgb = [10, 20, 30, 40, 50];
        let gray = luma_from_rgb(&rgb, 1, 1);
        assert_eq!(gray.len(), 1);
    }

    #[test]
    fn decode_finds_nothing_in_noise_free_gray() {
        let gray = vec![128u8; 64 * 64];
        assert_eq!(decode_grayscale(&gray, 64, 64), None);
    }
}
