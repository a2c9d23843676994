//! # imagerec-core
//!
//! The model-independent half of an ImageNet classifier: turning pixels into
//! the planar feature vector a network consumes, and turning the network's
//! scores back into a class label.
//!
//! ```
//! use imagerec_core::prelude::*;
//!
//! // a 1x1 BGR image
//! let features = extract(&[10, 20, 30], 1, 1).unwrap();
//! assert_eq!(features.as_slice(), &[10.0, 20.0, 30.0]);
//!
//! let labels: LabelTable = LabelTable::parse("0 wolf\n1 leopard\n2 broccoli\n");
//! let prediction = decode(&[0.1, 0.7, 0.2], &labels).unwrap();
//! assert_eq!(prediction.label, "leopard");
//! ```
//!
//! Running the network itself is left to an [`engine::InferenceEngine`]
//! implementation, see the `imagerec-engine` crate for one backed by tract.

#[macro_use]
extern crate log;

pub mod decode;
pub mod engine;
pub mod errors;
pub mod features;
pub mod labels;
pub mod recognizer;
pub mod source;

pub use errors::{RecognitionError, RecognitionResult};

pub mod prelude {
    pub use crate::decode::{argmax, decode, top_k, Prediction, ScoreVector};
    pub use crate::engine::{InferenceEngine, InputShape, ModelLoader, SerializedEngine};
    pub use crate::errors::{RecognitionError, RecognitionResult};
    pub use crate::features::{extract, extract_with_layout, rgba_to_bgr, FeatureVector, PixelLayout};
    pub use crate::labels::LabelTable;
    pub use crate::recognizer::{Recognition, Recognizer};
}

#[cfg(test)]
#[allow(dead_code)]
fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("IMAGEREC_LOG").try_init();
}
