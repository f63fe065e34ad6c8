use crate::config::INPUT_SIDE;
use crate::error::{ModelError, PredictError};
use crate::models::{ClassLabelTable, PredictionResult};
use crate::preprocess::{PreprocessedTensor, CHANNELS};
use std::path::Path;
use tract_onnx::prelude::*;

/// Anything that turns a preprocessed batch into one row of class scores.
pub trait Classifier: Send + Sync {
    fn scores(&self, input: &PreprocessedTensor) -> Result<Vec<f32>, PredictError>;
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

pub struct OnnxClassifier {
    model: OnnxPlan,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let load_err = |e: TractError| ModelError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        let side = INPUT_SIDE as usize;

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact([1, side, side, CHANNELS]).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        Ok(Self { model })
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&self, input: &PreprocessedTensor) -> Result<Vec<f32>, PredictError> {
        let inference_err = |e: TractError| PredictError::Inference(e.to_string());

        let tensor = input.data.clone().into_tensor();
        let result = self
            .model
            .run(tvec!(tensor.into()))
            .map_err(inference_err)?;

        let output = result
            .first()
            .ok_or_else(|| PredictError::Inference("model produced no outputs".into()))?;
        let view = output.to_array_view::<f32>().map_err(inference_err)?;

        // (1, num_classes): keep row 0
        let row = match view.ndim() {
            0 => return Err(PredictError::Inference("scalar model output".into())),
            1 => view.iter().copied().collect(),
            _ => view
                .index_axis(tract_ndarray::Axis(0), 0)
                .iter()
                .copied()
                .collect(),
        };
        Ok(row)
    }
}

/// Index of the largest score, first one wins on ties. NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in scores.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

pub fn classify(
    classifier: &dyn Classifier,
    labels: &ClassLabelTable,
    input: &PreprocessedTensor,
) -> Result<PredictionResult, PredictError> {
    let scores = classifier.scores(input)?;
    let class_index = argmax(&scores)
        .ok_or_else(|| PredictError::Inference("model returned no usable scores".into()))?;
    let label = labels.get(class_index).ok_or_else(|| {
        PredictError::Inference(format!(
            "class index {} outside label table of {}",
            class_index,
            labels.len()
        ))
    })?;

    Ok(PredictionResult {
        class_index,
        label: label.to_string(),
    })
}
