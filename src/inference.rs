use std::fs;
use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor as OrtTensor;
use tract_tflite::internal::DimLike;
use tract_tflite::prelude::*;
use tracing::{debug, info};

use crate::engine::{Engine, TensorDecl, TensorSignature};
use crate::error::{EvalError, Result};
use crate::types::Backend;

// =========================================================================
// TensorFlow Lite (tract)
// =========================================================================

/// A parsed `.tflite` flatbuffer, not yet optimized or planned.
pub struct TfliteModel {
    model: TypedModel,
}

impl TfliteModel {
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| EvalError::model_load(path, e))?;
        if metadata.len() == 0 {
            return Err(EvalError::model_load(path, "file is empty"));
        }
        let model = tract_tflite::tflite()
            .model_for_path(path)
            .map_err(|e| EvalError::model_load(path, e))?;
        Ok(Self { model })
    }

    /// Wraps a graph that is already in memory.
    pub fn from_typed(model: TypedModel) -> Self {
        Self { model }
    }

    pub fn signature(&self) -> Result<TensorSignature> {
        let model = &self.model;
        let inputs = model
            .input_outlets()
            .map_err(EvalError::context_build)?
            .iter()
            .enumerate()
            .map(|(ix, outlet)| {
                let fact = model.input_fact(ix).map_err(EvalError::context_build)?;
                Ok(TensorDecl {
                    index: outlet.node,
                    name: model.node(outlet.node).name.clone(),
                    shape: concrete_dims(&fact.shape),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let outputs = model
            .output_outlets()
            .map_err(EvalError::context_build)?
            .iter()
            .enumerate()
            .map(|(ix, outlet)| {
                let fact = model.output_fact(ix).map_err(EvalError::context_build)?;
                Ok(TensorDecl {
                    index: outlet.node,
                    name: model.node(outlet.node).name.clone(),
                    shape: concrete_dims(&fact.shape),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TensorSignature {
            tensors: model.nodes().len(),
            inputs,
            outputs,
        })
    }

    /// Optimizes the graph and turns it into an execution plan.
    pub fn build(self) -> Result<TfliteEngine> {
        let signature = self.signature()?;
        let input_shape = signature
            .inputs
            .first()
            .map(|decl| decl.shape.clone())
            .unwrap_or_default();
        let plan = self
            .model
            .into_optimized()
            .and_then(|model| model.into_runnable())
            .map_err(EvalError::context_build)?;

        Ok(TfliteEngine {
            plan,
            input_shape,
            signature,
        })
    }
}

fn concrete_dims(shape: &ShapeFact) -> Vec<usize> {
    shape.iter().map(|dim| dim.to_usize().unwrap_or(1)).collect()
}

pub struct TfliteEngine {
    plan: TypedRunnableModel<TypedModel>,
    input_shape: Vec<usize>,
    signature: TensorSignature,
}

impl Engine for TfliteEngine {
    fn name(&self) -> String {
        "TensorFlow Lite (tract)".to_string()
    }

    fn signature(&self) -> &TensorSignature {
        &self.signature
    }

    fn invoke(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let tensor = Tensor::from_shape(&self.input_shape, input).map_err(EvalError::inference)?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(EvalError::inference)?;
        let first = outputs
            .first()
            .ok_or_else(|| EvalError::inference("model produced no outputs"))?;
        let values = first.as_slice::<f32>().map_err(EvalError::inference)?;
        Ok(values.to_vec())
    }
}

// =========================================================================
// ONNX (ort)
// =========================================================================

/// Raw bytes of an `.onnx` graph.
pub struct OnnxModel {
    bytes: Vec<u8>,
}

impl OnnxModel {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| EvalError::model_load(path, e))?;
        if bytes.is_empty() {
            return Err(EvalError::model_load(path, "file is empty"));
        }
        Ok(Self { bytes })
    }

    pub fn build(self) -> Result<OnnxEngine> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_memory(&self.bytes))
            .map_err(EvalError::context_build)?;

        let inputs = session
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| TensorDecl {
                index,
                name: input.name.clone(),
                shape: input
                    .input_type
                    .tensor_shape()
                    .map(|shape| onnx_dims(shape))
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();
        let outputs = session
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| TensorDecl {
                index,
                name: output.name.clone(),
                shape: output
                    .output_type
                    .tensor_shape()
                    .map(|shape| onnx_dims(shape))
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        let input_shape = inputs
            .first()
            .map(|decl| decl.shape.iter().map(|&d| d as i64).collect())
            .unwrap_or_default();
        let signature = TensorSignature {
            tensors: inputs.len() + outputs.len(),
            inputs,
            outputs,
        };

        Ok(OnnxEngine {
            session,
            input_shape,
            signature,
        })
    }
}

// Dynamic dimensions (-1) become 1: one sample per call.
fn onnx_dims(shape: &[i64]) -> Vec<usize> {
    shape
        .iter()
        .map(|&d| if d < 1 { 1 } else { d as usize })
        .collect()
}

pub struct OnnxEngine {
    session: Session,
    input_shape: Vec<i64>,
    signature: TensorSignature,
}

impl Engine for OnnxEngine {
    fn name(&self) -> String {
        "ONNX Runtime".to_string()
    }

    fn signature(&self) -> &TensorSignature {
        &self.signature
    }

    fn invoke(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let tensor = OrtTensor::from_array((self.input_shape.clone(), input.to_vec()))
            .map_err(EvalError::inference)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(EvalError::inference)?;
        let (_shape, values) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(EvalError::inference)?;
        Ok(values.to_vec())
    }
}

// =========================================================================
// Backend selection
// =========================================================================

/// Resolves `Auto` from the file extension. Anything that is not `.onnx`
/// is treated as TensorFlow Lite.
pub fn resolve_backend(path: &Path, backend: Backend) -> Backend {
    match backend {
        Backend::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("onnx") => Backend::Onnx,
            _ => Backend::Tflite,
        },
        other => other,
    }
}

/// Loads the model at `path` and builds it into a runnable engine.
pub fn open_engine(path: &Path, backend: Backend) -> Result<Box<dyn Engine>> {
    let backend = resolve_backend(path, backend);
    debug!("Loading {} with backend {:?}", path.display(), backend);

    let engine: Box<dyn Engine> = match backend {
        Backend::Onnx => Box::new(OnnxModel::load(path)?.build()?),
        Backend::Tflite | Backend::Auto => Box::new(TfliteModel::load(path)?.build()?),
    };
    info!("Loaded {} using {}", path.display(), engine.name());
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Interpreter;
    use crate::types::IMAGE_LEN;
    use std::path::PathBuf;

    #[test]
    fn test_resolve_backend_from_extension() {
        let tflite = PathBuf::from("converted_model.tflite");
        let onnx = PathBuf::from("models/coords.ONNX");
        let bare = PathBuf::from("model");

        assert_eq!(resolve_backend(&tflite, Backend::Auto), Backend::Tflite);
        assert_eq!(resolve_backend(&onnx, Backend::Auto), Backend::Onnx);
        assert_eq!(resolve_backend(&bare, Backend::Auto), Backend::Tflite);
        assert_eq!(resolve_backend(&tflite, Backend::Onnx), Backend::Onnx);
    }

    #[test]
    fn test_onnx_dims_dynamic_batch() {
        assert_eq!(onnx_dims(&[-1, 28, 28]), vec![1, 28, 28]);
        assert_eq!(onnx_dims(&[1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_missing_tflite_is_load_failure() {
        let err = TfliteModel::load(Path::new("does/not/exist.tflite")).err().unwrap();
        assert!(matches!(err, EvalError::ModelLoad { .. }));
        assert!(err.to_string().contains("does/not/exist.tflite"));
    }

    #[test]
    fn test_malformed_tflite_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("converted_model.tflite");

        let garbage: Vec<u8> = (0..5000u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        let mut header = b"\x1c\x00\x00\x00TFL3".to_vec();
        header.extend_from_slice(&[0xAB; 64]);

        for bytes in [garbage, Vec::new(), header] {
            fs::write(&path, &bytes).unwrap();
            let err = TfliteModel::load(&path).err().unwrap();
            assert!(matches!(err, EvalError::ModelLoad { .. }), "{} bytes", bytes.len());
            assert!(err.to_string().contains("converted_model.tflite"));
        }
    }

    /// Source-only graph: the plan returns its input unchanged.
    fn passthrough_model(width: usize) -> TypedModel {
        let mut model = TypedModel::default();
        let source = model
            .add_source("input", TypedFact::dt_shape(f32::datum_type(), [1, width]))
            .unwrap();
        model.set_output_outlets(&[source]).unwrap();
        model
    }

    #[test]
    fn test_tflite_signature_from_graph() {
        let signature = TfliteModel::from_typed(passthrough_model(2)).signature().unwrap();
        assert_eq!(signature.inputs.len(), 1);
        assert_eq!(signature.outputs.len(), 1);
        assert_eq!(signature.inputs[0].name, "input");
        assert_eq!(signature.inputs[0].shape, vec![1, 2]);
        assert_eq!(signature.outputs[0].shape, vec![1, 2]);
        assert_eq!(signature.tensors, 1);
    }

    #[test]
    fn test_tflite_engine_runs_plan() {
        let mut engine = TfliteModel::from_typed(passthrough_model(2)).build().unwrap();
        assert_eq!(engine.invoke(&[0.25, 7.0]).unwrap(), vec![0.25, 7.0]);

        let mut interpreter = Interpreter::new(engine).unwrap();
        let prediction = interpreter.predict(&[3.0, 11.5]).unwrap();
        assert_eq!(prediction.x, 11.5);
        assert_eq!(prediction.y, 3.0);
    }

    #[test]
    fn test_tflite_engine_rejects_canvas_for_small_input() {
        let engine = TfliteModel::from_typed(passthrough_model(2)).build().unwrap();
        let mut interpreter = Interpreter::new(engine).unwrap();
        let image = crate::dataset::generate_image(0, 0, 2);
        let err = interpreter.predict(image.as_raw()).unwrap_err();
        assert!(matches!(err, EvalError::TensorMismatch(_)));
    }

    #[test]
    fn test_tflite_engine_takes_full_canvas() {
        let engine = TfliteModel::from_typed(passthrough_model(IMAGE_LEN)).build().unwrap();
        let mut interpreter = Interpreter::new(engine).unwrap();
        // Pixels (0, 0) and (1, 0) are lit, so the first two outputs are 1.0.
        let image = crate::dataset::generate_image(0, 0, 2);
        let prediction = interpreter.predict(image.as_raw()).unwrap();
        assert_eq!(prediction.x, 1.0);
        assert_eq!(prediction.y, 1.0);
        assert_eq!(interpreter.output(), image.as_raw().as_slice());
    }

    #[test]
    fn test_missing_onnx_is_load_failure() {
        let err = open_engine(Path::new("does/not/exist.onnx"), Backend::Auto)
            .err()
            .unwrap();
        assert!(matches!(err, EvalError::ModelLoad { .. }));
    }
}
