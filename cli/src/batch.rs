use std::time::Instant;

use anyhow::{Context, Result};
use imagerec_core::prelude::*;
use imagerec_core::source;

use crate::params::Parameters;

/// Classify every image of `params`, reporting one line per step to `out`.
///
/// The first failure aborts the rest of the batch.
pub fn run(params: &Parameters, out: &mut dyn FnMut(String)) -> Result<()> {
    run_with(&params.loader, params, out)
}

pub fn run_with<L: ModelLoader>(
    loader: &L,
    params: &Parameters,
    out: &mut dyn FnMut(String),
) -> Result<()> {
    if !params.model.exists() {
        anyhow::bail!("The model '{}' does not exist.", params.model.display());
    }
    out(format!("Using model {}", params.model.display()));

    let start = Instant::now();
    let recognizer = Recognizer::load(loader, &params.model, &params.labels)
        .with_context(|| format!("Setting up recognizer for {:?}", params.model))?;
    out(format!("Loading model... Elapsed time: {} ms", start.elapsed().as_millis()));
    info!("Model input {}, {} labels", recognizer.input_shape(), recognizer.labels().len());

    let (width, height) = (recognizer.required_width(), recognizer.required_height());
    for (name, path) in params.image_paths() {
        let pixels = source::load(&path, params.layout, width, height)?;
        let recognition = recognizer
            .recognize(&pixels, params.layout)
            .with_context(|| format!("Classifying {name}"))?;
        out(format!(
            "{} -> '{}'. Time elapsed: {} ms.",
            name,
            recognition.label(),
            recognition.elapsed.as_millis()
        ));
        if params.top > 1 {
            for (rank, (index, score)) in recognition.top_k(params.top).into_iter().enumerate() {
                let label = recognizer.labels().get(index).unwrap_or("?");
                out(format!("    #{} {:>8.3} {}", rank + 1, score, label));
            }
        }
    }
    Ok(())
}
