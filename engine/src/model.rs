use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::path::{Path, PathBuf};

use anyhow::Context;
use imagerec_core::prelude::*;
use tract_onnx::prelude::*;
use tract_onnx::tract_core::model::{Fact, Graph, TypedRunnableModel};
use tract_onnx::tract_core::ops::Op;

use crate::format::{ModelFormat, OutputSelection};

/// Loads classifiers with tract.
///
/// ONNX models get their input pinned to `f32 [1, 3, height, width]`; NNEF
/// models carry fully determined input facts of their own.
#[derive(Clone, Debug)]
pub struct TractLoader {
    pub format: Option<ModelFormat>,
    pub width: usize,
    pub height: usize,
    pub output: OutputSelection,
    pub optimize: bool,
}

impl Default for TractLoader {
    fn default() -> TractLoader {
        TractLoader {
            format: None,
            width: 224,
            height: 224,
            output: OutputSelection::Last,
            optimize: true,
        }
    }
}

impl TractLoader {
    pub fn format_for(&self, path: &Path) -> ModelFormat {
        self.format.unwrap_or_else(|| ModelFormat::guess(path))
    }

    fn load_typed(&self, path: &Path) -> TractResult<TypedModel> {
        match self.format_for(path) {
            ModelFormat::Onnx => {
                let mut model = tract_onnx::onnx().model_for_path(path)?;
                model.set_input_fact(0, f32::fact([1, 3, self.height, self.width]).into())?;
                select_output(&mut model, &self.output)?;
                model.into_typed()
            }
            ModelFormat::Nnef => {
                let mut model = tract_nnef::nnef().with_tract_core().model_for_path(path)?;
                select_output(&mut model, &self.output)?;
                Ok(model)
            }
        }
    }
}

fn select_output<F, O>(model: &mut Graph<F, O>, selection: &OutputSelection) -> TractResult<()>
where
    F: Fact + Hash + Clone + 'static,
    O: Debug + Display + AsRef<dyn Op> + AsMut<dyn Op> + Clone + 'static,
{
    match selection {
        OutputSelection::Last => {
            let outputs = model.output_outlets()?.to_vec();
            if outputs.len() > 1 {
                debug!("Model has {} outputs, keeping the last one", outputs.len());
                model.set_output_outlets(&outputs[outputs.len() - 1..])?;
            }
        }
        OutputSelection::Named(name) => model.set_output_names([name])?,
    }
    Ok(())
}

impl ModelLoader for TractLoader {
    type Engine = TractEngine;

    fn load_model(&self, path: &Path) -> RecognitionResult<TractEngine> {
        if !path.exists() {
            return Err(RecognitionError::model_load(path, anyhow::anyhow!("model file not found")));
        }
        let start = std::time::Instant::now();
        let engine = self
            .load_typed(path)
            .and_then(|model| TractEngine::from_model(model, self.optimize))
            .map_err(|e| RecognitionError::model_load(path, e))?;
        info!("Loaded {:?} ({}) in {:?}", path, self.format_for(path), start.elapsed());
        Ok(TractEngine { path: Some(path.to_owned()), ..engine })
    }
}

/// A runnable tract plan taking one planar image and producing class scores.
pub struct TractEngine {
    plan: TypedRunnableModel<TypedModel>,
    shape: InputShape,
    output_size: usize,
    path: Option<PathBuf>,
}

impl Debug for TractEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TractEngine({:?}, {}, {} classes)", self.path, self.shape, self.output_size)
    }
}

impl TractEngine {
    /// Wrap a typed model whose first input is `[1, C, H, W]`.
    pub fn from_model(model: TypedModel, optimize: bool) -> TractResult<TractEngine> {
        let model = if optimize { model.into_optimized()? } else { model.into_decluttered()? };
        let input = model.input_fact(0)?;
        let dims = input
            .shape
            .as_concrete()
            .with_context(|| format!("Input shape {input:?} is not concrete"))?;
        let &[1, channels, height, width] = dims else {
            anyhow::bail!("Expected a [1, C, H, W] input, got {dims:?}");
        };
        let output = model.output_fact(0)?;
        let output_size = output
            .shape
            .as_concrete()
            .map(|d| d.iter().product::<usize>())
            .with_context(|| format!("Output shape {output:?} is not concrete"))?;
        let shape = InputShape::new(width, height, channels);
        debug!("Input {shape}, {output_size} classes");
        Ok(TractEngine { plan: model.into_runnable()?, shape, output_size, path: None })
    }

    fn run(&self, features: &FeatureVector, shape: InputShape) -> TractResult<ScoreVector> {
        if shape != self.shape {
            anyhow::bail!("Model expects {}, got {}", self.shape, shape);
        }
        let input = Tensor::from_shape(
            &[1, shape.channels, shape.height, shape.width],
            features.as_slice(),
        )?;
        let outputs = self.plan.run(tvec!(input.into()))?;
        Ok(outputs[0].as_slice::<f32>()?.to_vec())
    }
}

impl InferenceEngine for TractEngine {
    fn input_shape(&self) -> InputShape {
        self.shape
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn evaluate(&self, features: &FeatureVector, shape: InputShape) -> RecognitionResult<ScoreVector> {
        self.run(features, shape).map_err(RecognitionError::evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity network: scores are the planar features themselves.
    fn identity(width: usize, height: usize) -> TractResult<TypedModel> {
        let mut model = TypedModel::default();
        let input = model.add_source("input", f32::fact([1, 3, height, width]))?;
        model.set_output_outlets(&[input])?;
        Ok(model)
    }

    #[test]
    fn geometry_from_model() -> TractResult<()> {
        let engine = TractEngine::from_model(identity(4, 2)?, true)?;
        assert_eq!(engine.input_shape(), InputShape::new(4, 2, 3));
        assert_eq!(engine.output_size(), 24);
        Ok(())
    }

    #[test]
    fn evaluates_planar_input() -> TractResult<()> {
        let engine = TractEngine::from_model(identity(1, 1)?, false)?;
        let features = extract(&[10, 20, 30], 1, 1)?;
        let scores = engine.evaluate(&features, engine.input_shape())?;
        assert_eq!(scores, vec![10.0, 20.0, 30.0]);
        Ok(())
    }

    #[test]
    fn recognizer_over_tract() -> TractResult<()> {
        let engine = TractEngine::from_model(identity(1, 1)?, true)?;
        let labels = LabelTable::parse("0 blue\n1 green\n2 red\n");
        let recognizer = Recognizer::new(engine, labels)?;
        // BGR 40, 90, 200: red dominates
        let r = recognizer.recognize(&[40, 90, 200], PixelLayout::Bgr)?;
        assert_eq!(r.label(), "red");
        Ok(())
    }

    #[test]
    fn wrong_shape_is_evaluation_error() -> TractResult<()> {
        let engine = TractEngine::from_model(identity(2, 2)?, true)?;
        let features = extract(&[0; 3], 1, 1)?;
        let err = engine.evaluate(&features, InputShape::new(1, 1, 3)).unwrap_err();
        assert!(matches!(err, RecognitionError::Evaluation(_)));
        Ok(())
    }

    #[test]
    fn rejects_non_image_input() -> TractResult<()> {
        let mut model = TypedModel::default();
        let input = model.add_source("input", f32::fact([3, 224, 224]))?;
        model.set_output_outlets(&[input])?;
        assert!(TractEngine::from_model(model, false).is_err());
        Ok(())
    }

    #[test]
    fn missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TractLoader::default().load_model(&dir.path().join("resnet18.onnx")).unwrap_err();
        assert!(matches!(err, RecognitionError::ModelLoad { .. }));
    }

    #[test]
    fn malformed_onnx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resnet18.onnx");
        std::fs::write(&path, b"this is not a protobuf").unwrap();
        let err = TractLoader::default().load_model(&path).unwrap_err();
        assert!(matches!(err, RecognitionError::ModelLoad { .. }));
    }

    #[test]
    fn nnef_round_trip() -> TractResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("identity.nnef.tar");
        tract_nnef::nnef().write_to_tar(&identity(2, 2)?, std::fs::File::create(&path)?)?;
        let engine = TractLoader::default().load_model(&path)?;
        assert_eq!(engine.input_shape(), InputShape::new(2, 2, 3));
        assert_eq!(engine.output_size(), 12);
        Ok(())
    }
}
