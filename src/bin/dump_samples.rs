use anyhow::{Context, Result};
use coord_eval::dataset::Dataset;
use coord_eval::types::{Image, BLOCK_RADIUS};
use image::{GrayImage, Luma};
use std::env;
use std::fs;
use std::path::Path;

fn to_gray(image: &Image) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let v = image.get_pixel(x, y)[0];
        Luma([(v.clamp(0.0, 1.0) * 255.0) as u8])
    })
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: dump_samples <output_dir>");
        return Ok(());
    }

    let dir = Path::new(&args[1]);
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let dataset = Dataset::generate(BLOCK_RADIUS);
    for (image, label) in dataset.iter() {
        let path = dir.join(format!("sample_{:02}_{:02}.png", label.y, label.x));
        to_gray(image)
            .save(&path)
            .with_context(|| format!("saving {}", path.display()))?;
    }

    println!("Wrote {} samples to {}", dataset.len(), dir.display());
    Ok(())
}
