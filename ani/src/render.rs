use std::io::Write;

use image::{
    codecs::gif::{GifEncoder, Repeat},
    imageops::{self, FilterType},
    Delay, Frame, RgbaImage,
};

use crate::{error::AniError, DecodedFrame, Palette, TRANSPARENT_INDEX};

fn max_dimensions(frames: &[DecodedFrame]) -> (u32, u32) {
    frames.iter().fold((0, 0), |(width, height), frame| {
        (width.max(frame.width as u32), height.max(frame.height as u32))
    })
}

// transparent pixels leave the canvas untouched
fn blit(canvas: &mut RgbaImage, frame: &DecodedFrame, palette: &Palette, left: u32, top: u32) {
    let width = frame.width as u32;

    frame
        .pixels
        .iter()
        .enumerate()
        .filter(|(_, index)| **index != TRANSPARENT_INDEX)
        .for_each(|(i, &index)| {
            let (x, y) = (left + i as u32 % width, top + i as u32 / width);

            if x < canvas.width() && y < canvas.height() {
                canvas.put_pixel(x, y, palette.rgba(index));
            }
        });
}

/// All frames side by side in cells of the largest frame size, bottom aligned.
pub fn compose_strip(frames: &[DecodedFrame], palette: &Palette) -> RgbaImage {
    let (cell_width, cell_height) = max_dimensions(frames);
    let mut strip = RgbaImage::new(cell_width * frames.len() as u32, cell_height);

    frames.iter().enumerate().for_each(|(i, frame)| {
        let left = i as u32 * cell_width;
        let top = cell_height - frame.height as u32;

        blit(&mut strip, frame, palette, left, top);
    });

    strip
}

/// One frame on a `width` x `height` canvas, left and bottom aligned.
pub fn pad_to_canvas(frame: &DecodedFrame, palette: &Palette, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let top = height.saturating_sub(frame.height as u32);

    blit(&mut canvas, frame, palette, 0, top);

    canvas
}

/// Integer nearest neighbour upscale. `zoom` of 0 or 1 returns the image as is.
///
/// Fails when the zoomed size does not fit in `u32`.
pub fn upscale(image: RgbaImage, zoom: u32) -> Result<RgbaImage, AniError> {
    if zoom <= 1 {
        return Ok(image);
    }

    let (width, height) = image.dimensions();

    let (Some(zoomed_width), Some(zoomed_height)) =
        (width.checked_mul(zoom), height.checked_mul(zoom))
    else {
        return Err(AniError::ZoomTooLarge {
            zoom,
            width,
            height,
        });
    };

    Ok(imageops::resize(
        &image,
        zoomed_width,
        zoomed_height,
        FilterType::Nearest,
    ))
}

/// Writes an endlessly looping GIF with one frame per decoded frame.
pub fn write_gif(
    writer: impl Write,
    frames: &[DecodedFrame],
    palette: &Palette,
    delay_ms: u32,
    zoom: u32,
) -> Result<(), AniError> {
    let (width, height) = max_dimensions(frames);

    let gif_frames = frames
        .iter()
        .map(|frame| {
            let canvas = upscale(pad_to_canvas(frame, palette, width, height), zoom)?;

            Ok(Frame::from_parts(
                canvas,
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            ))
        })
        .collect::<Result<Vec<Frame>, AniError>>()?;

    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;

    encoder.encode_frames(gif_frames)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use image::Rgba;

    use super::*;

    fn filled(width: u16, height: u16, index: u8) -> DecodedFrame {
        let mut frame = DecodedFrame::blank(width, height);
        frame.pixels.fill(index);

        frame
    }

    #[test]
    fn strip_is_bottom_aligned() {
        let palette = Palette::fallback();
        let frames = [filled(4, 6, 5), filled(2, 3, 9)];

        let strip = compose_strip(&frames, &palette);

        assert_eq!(strip.dimensions(), (8, 6));

        assert_eq!(*strip.get_pixel(0, 0), palette.rgba(5));
        // second cell starts at x = 4, its frame is 3 tall so rows 0..3 stay empty
        assert_eq!(*strip.get_pixel(4, 2), Rgba([0, 0, 0, 0]));
        assert_eq!(*strip.get_pixel(4, 3), palette.rgba(9));
        assert_eq!(*strip.get_pixel(5, 5), palette.rgba(9));
        assert_eq!(*strip.get_pixel(6, 5), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn empty_strip() {
        let strip = compose_strip(&[], &Palette::fallback());

        assert_eq!(strip.dimensions(), (0, 0));
    }

    #[test]
    fn index_zero_is_transparent() {
        let palette = Palette::fallback();
        let mut frame = filled(2, 1, 3);
        frame.pixels[1] = 0;

        let image = frame.to_rgba8(&palette);

        assert_eq!(image.get_pixel(0, 0)[3], 255);
        assert_eq!(image.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn canvas_and_zoom() {
        let palette = Palette::fallback();
        let frame = filled(2, 2, 7);

        let canvas = pad_to_canvas(&frame, &palette, 3, 4);
        assert_eq!(*canvas.get_pixel(0, 1), Rgba([0, 0, 0, 0]));
        assert_eq!(*canvas.get_pixel(1, 3), palette.rgba(7));

        let zoomed = upscale(canvas, 3).unwrap();
        assert_eq!(zoomed.dimensions(), (9, 12));
        assert_eq!(*zoomed.get_pixel(5, 11), palette.rgba(7));
    }

    #[test]
    fn zoom_overflow_is_an_error() {
        let image = DecodedFrame::blank(4096, 1).to_rgba8(&Palette::fallback());

        assert!(matches!(
            upscale(image, 2_000_000),
            Err(AniError::ZoomTooLarge {
                zoom: 2_000_000,
                width: 4096,
                height: 1
            })
        ));

        let mut bytes = vec![];
        let frames = [filled(4096, 1, 3)];

        assert!(write_gif(&mut bytes, &frames, &Palette::fallback(), 100, 2_000_000).is_err());
    }

    #[test]
    fn gif_has_header() {
        let palette = Palette::fallback();
        let frames = [filled(4, 4, 20), filled(4, 2, 40)];
        let mut bytes = vec![];

        write_gif(&mut bytes, &frames, &palette, 100, 2).unwrap();

        assert_eq!(&bytes[..6], b"GIF89a");
    }
}
