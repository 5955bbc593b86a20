use std::sync::Arc;

use image::RgbaImage;

/// Rendered page pixels. Shared so that state snapshots never copy pixel data.
pub type Bitmap = Arc<RgbaImage>;

/// Height of a page rendered at `target_width`, preserving the page's aspect
/// ratio. Rounds down and never returns less than one pixel.
pub fn scaled_height(target_width: u32, page_width: f32, page_height: f32) -> u32 {
    if page_width <= 0.0 || page_height <= 0.0 {
        return target_width.max(1);
    }
    let height = (f64::from(target_width) * f64::from(page_height) / f64::from(page_width)).floor();
    (height as u32).max(1)
}

/// Blend every pixel onto an opaque white background.
///
/// PDF pages are allowed to be transparent; without this they would show
/// whatever the view paints behind them.
pub fn composite_onto_white(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let alpha = u32::from(pixel[3]);
        if alpha == 255 {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            let blended = (u32::from(*channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            *channel = blended as u8;
        }
        pixel[3] = 255;
    }
}
