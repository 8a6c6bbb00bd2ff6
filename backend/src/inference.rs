use std::path::Path;

use tract_onnx::prelude::*;

use crate::error::ScanError;
use crate::models::ProbabilityVector;
use crate::preprocess::{InputTensor, INPUT_SHAPE};

/// Maps a preprocessed image to per-class probabilities.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &InputTensor) -> Result<ProbabilityVector, ScanError>;
}

pub struct ModelInference {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
}

impl ModelInference {
    pub fn load<P: AsRef<Path>>(model_path: P) -> anyhow::Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 224, 224, 3)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model })
    }

    fn run(&self, input: &InputTensor) -> TractResult<Vec<f32>> {
        let input_tensor = Tensor::from_shape(&INPUT_SHAPE, input.data())?;
        let outputs = self.model.run(tvec!(input_tensor.into()))?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("model produced no output"))?;
        Ok(output.to_array_view::<f32>()?.iter().copied().collect())
    }
}

impl Classifier for ModelInference {
    fn classify(&self, input: &InputTensor) -> Result<ProbabilityVector, ScanError> {
        let probs = self
            .run(input)
            .map_err(|e| ScanError::Inference(e.to_string()))?;
        ProbabilityVector::try_from(probs)
    }
}
