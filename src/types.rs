use clap::ValueEnum;
use image::{ImageBuffer, Luma};
use serde::Deserialize;

pub const IMAGE_WIDTH: u32 = 28;
pub const IMAGE_HEIGHT: u32 = 28;
pub const BLOCK_RADIUS: i32 = 2;

/// Number of `f32` values in one canvas raster.
pub const IMAGE_LEN: usize = (IMAGE_WIDTH * IMAGE_HEIGHT) as usize;

/// Binary raster on the canvas, row-major, 0.0 background / 1.0 foreground.
pub type Image = ImageBuffer<Luma<f32>, Vec<f32>>;

/// True center of a generated block. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub x: i32,
    pub y: i32,
}

impl Label {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Coordinate read back from the model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub x: f32,
    pub y: f32,
}

/// One evaluated sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalRecord {
    pub prediction: Prediction,
    pub label: Label,
    pub distance: f32,
}

impl EvalRecord {
    pub fn new(prediction: Prediction, label: Label) -> Self {
        let distance = distance(
            (label.x as f32, label.y as f32),
            (prediction.x, prediction.y),
        );
        Self {
            prediction,
            label,
            distance,
        }
    }
}

/// Euclidean distance between two points.
///
/// Differences are taken in `f32`, squared and rooted in `f64`.
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt() as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Pick from the model file extension
    #[default]
    Auto,
    /// TensorFlow Lite flatbuffer
    Tflite,
    /// ONNX graph
    Onnx,
}
