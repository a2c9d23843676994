//! Boundary with the inference engine.
//!
//! The pipeline never sees a concrete runtime: anything able to turn a planar
//! feature vector into per-class scores can sit behind [`InferenceEngine`].

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use crate::decode::ScoreVector;
use crate::errors::{RecognitionError, RecognitionResult};
use crate::features::FeatureVector;

/// Geometry of the image a model accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputShape {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl InputShape {
    pub fn new(width: usize, height: usize, channels: usize) -> InputShape {
        InputShape { width, height, channels }
    }

    pub fn volume(&self) -> usize {
        self.width * self.height * self.channels
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Engines only need to be `Send`. Wrap one in [`SerializedEngine`] to share
/// it between threads when it is not `Sync` itself.
pub trait InferenceEngine: Send {
    fn input_shape(&self) -> InputShape;

    /// Number of classes the model scores.
    fn output_size(&self) -> usize;

    fn evaluate(&self, features: &FeatureVector, shape: InputShape) -> RecognitionResult<ScoreVector>;
}

/// Builds engines from model files.
pub trait ModelLoader {
    type Engine: InferenceEngine;

    fn load_model(&self, path: &Path) -> RecognitionResult<Self::Engine>;
}

/// Single critical section around every evaluation.
#[derive(Debug)]
pub struct SerializedEngine<E> {
    shape: InputShape,
    output_size: usize,
    inner: Mutex<E>,
}

impl<E: InferenceEngine> SerializedEngine<E> {
    pub fn new(engine: E) -> SerializedEngine<E> {
        SerializedEngine {
            shape: engine.input_shape(),
            output_size: engine.output_size(),
            inner: Mutex::new(engine),
        }
    }
}

impl<E: InferenceEngine> InferenceEngine for SerializedEngine<E> {
    fn input_shape(&self) -> InputShape {
        self.shape
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn evaluate(&self, features: &FeatureVector, shape: InputShape) -> RecognitionResult<ScoreVector> {
        let engine = self
            .inner
            .lock()
            .map_err(|_| RecognitionError::evaluation(anyhow::anyhow!("engine lock poisoned")))?;
        engine.evaluate(features, shape)
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn input_shape(&self) -> InputShape {
        (**self).input_shape()
    }

    fn output_size(&self) -> usize {
        (**self).output_size()
    }

    fn evaluate(&self, features: &FeatureVector, shape: InputShape) -> RecognitionResult<ScoreVector> {
        (**self).evaluate(features, shape)
    }
}
