use tracing::debug;

use crate::error::{EvalError, Result};
use crate::types::Prediction;

/// One tensor slot in a model's interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorDecl {
    /// Index of the tensor (or graph node) inside the model
    pub index: usize,
    pub name: String,
    pub shape: Vec<usize>,
}

impl TensorDecl {
    /// Element count. Dynamic dimensions are reported as 1 by the backends.
    pub fn volume(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Declared interface of a loaded model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TensorSignature {
    /// Total number of tensors (or graph nodes) the backend reports
    pub tensors: usize,
    pub inputs: Vec<TensorDecl>,
    pub outputs: Vec<TensorDecl>,
}

/// A model that has been built into something runnable.
///
/// Implementations consume one flat `f32` input and return the flat `f32`
/// contents of their first output tensor.
pub trait Engine {
    fn name(&self) -> String;
    fn signature(&self) -> &TensorSignature;
    fn invoke(&mut self, input: &[f32]) -> Result<Vec<f32>>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn signature(&self) -> &TensorSignature {
        (**self).signature()
    }

    fn invoke(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        (**self).invoke(input)
    }
}

/// Engine plus the single input/output buffer pair reused across samples.
///
/// Only the first declared input and first declared output are used.
pub struct Interpreter<E: Engine> {
    engine: E,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl<E: Engine> Interpreter<E> {
    /// Allocates buffers from the engine's declared shapes.
    pub fn new(engine: E) -> Result<Self> {
        let signature = engine.signature();
        debug!("Tensors size: {}", signature.tensors);
        debug!("Inputs size: {}", signature.inputs.len());
        debug!("Outputs size: {}", signature.outputs.len());

        let input_decl = signature.inputs.first().ok_or_else(|| {
            EvalError::context_build("model declares no input tensor")
        })?;
        let output_decl = signature.outputs.first().ok_or_else(|| {
            EvalError::context_build("model declares no output tensor")
        })?;
        debug!(
            "Input tensor index: {} ({}, {:?})",
            input_decl.index, input_decl.name, input_decl.shape
        );
        debug!(
            "Output tensor index: {} ({}, {:?})",
            output_decl.index, output_decl.name, output_decl.shape
        );

        let input = vec![0.0; input_decl.volume()];
        let output = vec![0.0; output_decl.volume()];
        Ok(Self {
            engine,
            input,
            output,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn input(&self) -> &[f32] {
        &self.input
    }

    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Copies `data` into the input buffer. The length must equal the
    /// declared input element count.
    pub fn set_input(&mut self, data: &[f32]) -> Result<()> {
        if data.len() != self.input.len() {
            return Err(EvalError::TensorMismatch(format!(
                "input tensor holds {} values, image has {}",
                self.input.len(),
                data.len()
            )));
        }
        self.input.copy_from_slice(data);
        Ok(())
    }

    pub fn invoke(&mut self) -> Result<()> {
        self.output = self.engine.invoke(&self.input)?;
        Ok(())
    }

    /// Reads the coordinate pair. The model stores (y, x): index 1 is x,
    /// index 0 is y.
    pub fn prediction(&self) -> Result<Prediction> {
        match self.output.as_slice() {
            [y, x, ..] => Ok(Prediction { x: *x, y: *y }),
            _ => Err(EvalError::TensorMismatch(format!(
                "output tensor holds {} values, need 2",
                self.output.len()
            ))),
        }
    }

    pub fn predict(&mut self, data: &[f32]) -> Result<Prediction> {
        self.set_input(data)?;
        self.invoke()?;
        self.prediction()
    }
}
