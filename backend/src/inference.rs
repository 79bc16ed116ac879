use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, ensure, Context};
use log::info;
use serde::Serialize;
use tract_onnx::prelude::*;

use crate::config::ServerConfig;
use crate::models::{PatientFeatures, RiskReport};

pub const MODEL_VERSION: &str = "1.0.0";

/// A binary classifier over a fixed-width feature row.
pub trait RiskClassifier: Send + Sync {
    /// Number of input columns the model expects.
    fn width(&self) -> usize;

    /// Score for the positive ("at risk") class.
    fn classify(&self, features: &[f32]) -> anyhow::Result<f32>;
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct OnnxClassifier {
    model: OnnxPlan,
    width: usize,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P, width: usize) -> TractResult<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, width })
    }
}

impl RiskClassifier for OnnxClassifier {
    fn width(&self) -> usize {
        self.width
    }

    fn classify(&self, features: &[f32]) -> anyhow::Result<f32> {
        let input = Tensor::from_shape(&[1, self.width], features)?;
        let outputs = self.model.run(tvec!(input.into()))?;
        let first = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no output"))?;

        // sklearn exports emit an i64 label first; probability models emit f32.
        let scores = first.cast_to::<f32>()?;
        let score = scores
            .as_slice::<f32>()?
            .first()
            .copied()
            .ok_or_else(|| anyhow!("model output is empty"))?;
        Ok(score)
    }
}

/// Zero-pads `base` to `width` columns.
pub fn pad_features(mut base: Vec<f32>, width: usize) -> anyhow::Result<Vec<f32>> {
    ensure!(
        base.len() <= width,
        "model expects {} features but {} are required",
        width,
        base.len()
    );
    base.resize(width, 0.0);
    Ok(base)
}

#[derive(Debug, Default)]
pub struct PredictionStats {
    total: AtomicU64,
    failed: AtomicU64,
    total_time_us: AtomicU64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub total_predictions: u64,
    pub failed_predictions: u64,
    pub average_time_ms: f64,
}

impl PredictionStats {
    pub fn record(&self, ok: bool, elapsed_us: u64) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.total_time_us.fetch_add(elapsed_us, Ordering::Relaxed);
        if !ok {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let time_us = self.total_time_us.load(Ordering::Relaxed);
        StatsSnapshot {
            total_predictions: total,
            failed_predictions: self.failed.load(Ordering::Relaxed),
            average_time_ms: if total == 0 {
                0.0
            } else {
                time_us as f64 / total as f64 / 1000.0
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub version: String,
    pub threshold: f32,
    pub heart_features: usize,
    pub stroke_features: usize,
    pub diabetes_features: usize,
    pub inputs: Vec<String>,
}

/// The three risk models behind `/predict`.
pub struct RiskModels {
    heart: Box<dyn RiskClassifier>,
    stroke: Box<dyn RiskClassifier>,
    diabetes: Box<dyn RiskClassifier>,
    threshold: f32,
}

impl RiskModels {
    pub fn new(
        heart: Box<dyn RiskClassifier>,
        stroke: Box<dyn RiskClassifier>,
        diabetes: Box<dyn RiskClassifier>,
        threshold: f32,
    ) -> anyhow::Result<Self> {
        ensure!(heart.width() >= 7, "heart model needs at least 7 features");
        ensure!(stroke.width() >= 9, "stroke model needs at least 9 features");
        ensure!(diabetes.width() >= 8, "diabetes model needs at least 8 features");
        Ok(Self {
            heart,
            stroke,
            diabetes,
            threshold,
        })
    }

    /// Loads `heart.onnx`, `stroke.onnx` and `diabetes.onnx` from the model directory.
    pub fn load(config: &ServerConfig) -> anyhow::Result<Self> {
        let dir = &config.model_dir;
        let load = |name: &str, width: usize| -> anyhow::Result<Box<dyn RiskClassifier>> {
            let path = dir.join(name);
            let model = OnnxClassifier::load(&path, width)
                .with_context(|| format!("cannot load {}", path.display()))?;
            info!("Loaded {} ({} features)", path.display(), width);
            Ok(Box::new(model))
        };

        Self::new(
            load("heart.onnx", config.heart_features)?,
            load("stroke.onnx", config.stroke_features)?,
            load("diabetes.onnx", config.diabetes_features)?,
            config.threshold,
        )
    }

    pub fn assess(&self, features: &PatientFeatures) -> anyhow::Result<RiskReport> {
        let heart = self.score(self.heart.as_ref(), features.heart_features())?;
        let stroke = self.score(self.stroke.as_ref(), features.stroke_features())?;
        let diabetes = self.score(self.diabetes.as_ref(), features.diabetes_features())?;
        Ok(RiskReport::new(features, heart, stroke, diabetes))
    }

    fn score(&self, model: &dyn RiskClassifier, base: Vec<f32>) -> anyhow::Result<bool> {
        let row = pad_features(base, model.width())?;
        Ok(model.classify(&row)? >= self.threshold)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            version: MODEL_VERSION.to_string(),
            threshold: self.threshold,
            heart_features: self.heart.width(),
            stroke_features: self.stroke.width(),
            diabetes_features: self.diabetes.width(),
            inputs: [
                "age",
                "gender",
                "systolic",
                "diastolic",
                "cholesterol",
                "glucose",
                "bmi",
                "smoking",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthInput;
    use std::sync::{Arc, Mutex};

    struct Recording {
        width: usize,
        score: f32,
        seen: Arc<Mutex<Vec<Vec<f32>>>>,
    }

    impl RiskClassifier for Recording {
        fn width(&self) -> usize {
            self.width
        }

        fn classify(&self, features: &[f32]) -> anyhow::Result<f32> {
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(self.score)
        }
    }

    fn patient() -> PatientFeatures {
        HealthInput {
            age: "40".into(),
            gender: "female".into(),
            systolic: "118".into(),
            diastolic: "76".into(),
            cholesterol: "180".into(),
            glucose: "210".into(),
            bmi: "22".into(),
            smoking: "no".into(),
        }
        .parse()
        .unwrap()
    }

    #[test]
    fn pad_features_extends_with_zeros() {
        assert_eq!(pad_features(vec![1.0, 2.0], 4).unwrap(), vec![1.0, 2.0, 0.0, 0.0]);
        assert!(pad_features(vec![1.0, 2.0, 3.0], 2).is_err());
    }

    #[test]
    fn assess_pads_rows_and_applies_threshold() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let make = |width, score| -> Box<dyn RiskClassifier> {
            Box::new(Recording {
                width,
                score,
                seen: seen.clone(),
            })
        };
        let models = RiskModels::new(make(13, 0.2), make(10, 0.5), make(8, 0.9), 0.5).unwrap();

        let report = models.assess(&patient()).unwrap();
        assert_eq!(report.heart_risk, "✅ Low Risk");
        assert_eq!(report.stroke_risk, "⚠ At Risk");
        assert_eq!(report.diabetes, "⚠ At Risk (Uncontrolled)");
        assert_eq!(report.bp_category, "Normal");

        let rows = seen.lock().unwrap();
        assert_eq!(rows.iter().map(Vec::len).collect::<Vec<_>>(), vec![13, 10, 8]);
        assert_eq!(&rows[0][7..], &[0.0; 6]);
    }

    #[test]
    fn narrow_models_are_rejected() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let make = |width| -> Box<dyn RiskClassifier> {
            Box::new(Recording {
                width,
                score: 0.0,
                seen: seen.clone(),
            })
        };
        assert!(RiskModels::new(make(13), make(8), make(8), 0.5).is_err());
    }

    #[test]
    fn stats_average_in_milliseconds() {
        let stats = PredictionStats::default();
        assert_eq!(stats.snapshot().average_time_ms, 0.0);
        stats.record(true, 2_000);
        stats.record(false, 4_000);
        let snap = stats.snapshot();
        assert_eq!(snap.total_predictions, 2);
        assert_eq!(snap.failed_predictions, 1);
        assert_eq!(snap.average_time_ms, 3.0);
    }
}
