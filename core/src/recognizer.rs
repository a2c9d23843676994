use std::path::Path;
use std::time::{Duration, Instant};

use crate::decode::{decode, top_k, Prediction, ScoreVector};
use crate::engine::{InferenceEngine, InputShape, ModelLoader};
use crate::errors::{RecognitionError, RecognitionResult};
use crate::features::{extract_with_layout, PixelLayout};
use crate::labels::LabelTable;

/// Outcome of classifying one image.
#[derive(Clone, Debug)]
pub struct Recognition {
    pub prediction: Prediction,
    pub scores: ScoreVector,
    /// Wall-clock time from raw pixels to label.
    pub elapsed: Duration,
}

impl Recognition {
    pub fn label(&self) -> &str {
        &self.prediction.label
    }

    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        top_k(&self.scores, k)
    }
}

/// An engine paired with the labels of the classes it scores.
#[derive(Debug)]
pub struct Recognizer<E> {
    engine: E,
    labels: LabelTable,
}

impl<E: InferenceEngine> Recognizer<E> {
    pub fn new(engine: E, labels: LabelTable) -> RecognitionResult<Recognizer<E>> {
        let classes = engine.output_size();
        if labels.len() < classes {
            return Err(RecognitionError::LabelCountMismatch { labels: labels.len(), classes });
        }
        if labels.len() > classes {
            warn!(
                "{} labels for a model scoring {} classes, extra labels are unused",
                labels.len(),
                classes
            );
        }
        Ok(Recognizer { engine, labels })
    }

    pub fn load<L>(loader: &L, model: &Path, labels: &Path) -> RecognitionResult<Recognizer<E>>
    where
        L: ModelLoader<Engine = E>,
    {
        let engine = loader.load_model(model)?;
        let labels = LabelTable::load(labels)?;
        Recognizer::new(engine, labels)
    }

    pub fn input_shape(&self) -> InputShape {
        self.engine.input_shape()
    }

    pub fn required_width(&self) -> usize {
        self.input_shape().width
    }

    pub fn required_height(&self) -> usize {
        self.input_shape().height
    }

    pub fn required_channels(&self) -> usize {
        self.input_shape().channels
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Classify a raw image already sized to [`Recognizer::input_shape`].
    pub fn recognize(&self, image: &[u8], layout: PixelLayout) -> RecognitionResult<Recognition> {
        let start = Instant::now();
        let shape = self.input_shape();
        let features = extract_with_layout(image, layout, shape.width, shape.height)?;
        let scores = self.engine.evaluate(&features, shape)?;
        let prediction = decode(&scores, &self.labels)?;
        let elapsed = start.elapsed();
        debug!(
            "class #{} ({}) score {} in {:?}",
            prediction.index, prediction.label, prediction.score, elapsed
        );
        Ok(Recognition { prediction, scores, elapsed })
    }
}
