//! tract backend for `imagerec-core`.
//!
//! ```no_run
//! use imagerec_core::prelude::*;
//! use imagerec_engine::TractLoader;
//!
//! # fn main() -> RecognitionResult<()> {
//! let recognizer = Recognizer::load(
//!     &TractLoader::default(),
//!     "resources/models/resnet18.onnx".as_ref(),
//!     "resources/imagenet1000_clsid.txt".as_ref(),
//! )?;
//! let pixels = imagerec_core::source::load_bgr("timber-wolf.jpg", 224, 224)?;
//! println!("{}", recognizer.recognize(&pixels, PixelLayout::Bgr)?.label());
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod format;
pub mod model;

pub use format::{ModelFormat, OutputSelection};
pub use model::{TractEngine, TractLoader};
