use image::Luma;

use crate::types::{Image, Label, IMAGE_HEIGHT, IMAGE_WIDTH};

const FOREGROUND: Luma<f32> = Luma([1.0]);

/// Rasterizes a filled square of half-width `radius` centered at
/// (`center_x`, `center_y`). Pixels outside the canvas are skipped.
pub fn generate_image(center_x: i32, center_y: i32, radius: i32) -> Image {
    let mut image = Image::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    let (x_min, x_max) = clip_span(center_x, radius, IMAGE_WIDTH);
    let (y_min, y_max) = clip_span(center_y, radius, IMAGE_HEIGHT);
    for x in x_min..=x_max {
        for y in y_min..=y_max {
            write_pixel(&mut image, x, y);
        }
    }
    image
}

// Empty when the span misses the canvas (min > max).
fn clip_span(center: i32, radius: i32, extent: u32) -> (i32, i32) {
    let min = center.saturating_sub(radius).max(0);
    let max = center.saturating_add(radius).min(extent as i32 - 1);
    (min, max)
}

fn write_pixel(image: &mut Image, x: i32, y: i32) {
    if (0..IMAGE_WIDTH as i32).contains(&x) && (0..IMAGE_HEIGHT as i32).contains(&y) {
        image.put_pixel(x as u32, y as u32, FOREGROUND);
    }
}

/// One image per canvas pixel, paired with its center.
#[derive(Debug, Clone)]
pub struct Dataset {
    images: Vec<Image>,
    labels: Vec<Label>,
}

impl Dataset {
    /// Walks the canvas row by row. Sample `row * width + col` is centered
    /// at column `col`, row `row`.
    pub fn generate(radius: i32) -> Self {
        let count = (IMAGE_WIDTH * IMAGE_HEIGHT) as usize;
        let mut images = Vec::with_capacity(count);
        let mut labels = Vec::with_capacity(count);

        for row in 0..IMAGE_HEIGHT as i32 {
            for col in 0..IMAGE_WIDTH as i32 {
                images.push(generate_image(col, row, radius));
                labels.push(Label::new(col, row));
            }
        }

        Self { images, labels }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Image, Label)> + '_ {
        self.images.iter().zip(self.labels.iter().copied())
    }
}
