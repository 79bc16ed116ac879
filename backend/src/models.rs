use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Form payload as posted by the client. Every value is raw text.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HealthInput {
    pub age: String,
    pub gender: String,
    pub systolic: String,
    pub diastolic: String,
    pub cholesterol: String,
    pub glucose: String,
    pub bmi: String,
    pub smoking: String,
}

impl HealthInput {
    pub fn parse(&self) -> Result<PatientFeatures, ApiError> {
        Ok(PatientFeatures {
            age: parse_int("age", &self.age)?,
            male: self.gender.trim().eq_ignore_ascii_case("male"),
            systolic: parse_int("systolic", &self.systolic)?,
            diastolic: parse_int("diastolic", &self.diastolic)?,
            cholesterol: parse_float("cholesterol", &self.cholesterol)?,
            glucose: parse_float("glucose", &self.glucose)?,
            bmi: parse_float("bmi", &self.bmi)?,
            smoker: self.smoking.trim().eq_ignore_ascii_case("yes"),
        })
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32, ApiError> {
    raw.trim().parse::<i32>().map_err(|_| ApiError::InvalidInput {
        field,
        value: raw.to_string(),
        expected: "an integer",
    })
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, ApiError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::InvalidInput {
            field,
            value: raw.to_string(),
            expected: "a number",
        }),
    }
}

/// Typed, encoded view of a [`HealthInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientFeatures {
    pub age: i32,
    pub male: bool,
    pub systolic: i32,
    pub diastolic: i32,
    pub cholesterol: f64,
    pub glucose: f64,
    pub bmi: f64,
    pub smoker: bool,
}

impl PatientFeatures {
    pub fn hypertensive(&self) -> bool {
        self.systolic >= 140 || self.diastolic >= 90
    }

    pub fn heart_features(&self) -> Vec<f32> {
        vec![
            self.age as f32,
            flag(self.male),
            self.cholesterol as f32,
            self.systolic as f32,
            self.diastolic as f32,
            self.bmi as f32,
            flag(self.smoker),
        ]
    }

    pub fn stroke_features(&self) -> Vec<f32> {
        vec![
            flag(self.male),
            self.age as f32,
            flag(self.hypertensive()),
            0.0,
            self.glucose as f32,
            flag(self.smoker),
            self.bmi as f32,
            0.0,
            0.0,
        ]
    }

    pub fn diabetes_features(&self) -> Vec<f32> {
        vec![
            0.0,
            self.glucose as f32,
            0.0,
            0.0,
            0.0,
            self.bmi as f32,
            0.0,
            self.age as f32,
        ]
    }

    pub fn blood_pressure(&self) -> BloodPressureCategory {
        BloodPressureCategory::from_reading(self.systolic, self.diastolic)
    }

    pub fn glucose_level(&self) -> GlucoseLevel {
        GlucoseLevel::from_glucose(self.glucose)
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Blood pressure category, checked top to bottom.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BloodPressureCategory {
    /// systolic < 120 and diastolic < 80
    Normal,
    /// systolic 120-129 and diastolic < 80
    Elevated,
    /// systolic 130-139 or diastolic 80-89
    HypertensionStage1,
    /// systolic 140-180 or diastolic 90-120
    HypertensionStage2,
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    pub fn from_reading(systolic: i32, diastolic: i32) -> Self {
        let (s, d) = (systolic, diastolic);
        if s < 120 && d < 80 {
            Self::Normal
        } else if (120..=129).contains(&s) && d < 80 {
            Self::Elevated
        } else if (130..=139).contains(&s) || (80..=89).contains(&d) {
            Self::HypertensionStage1
        } else if (140..=180).contains(&s) || (90..=120).contains(&d) {
            Self::HypertensionStage2
        } else {
            Self::HypertensiveCrisis
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::HypertensionStage1 => "Hypertension Stage 1",
            Self::HypertensionStage2 => "Hypertension Stage 2",
            Self::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum GlucoseLevel {
    Controlled,
    Prediabetic,
    Uncontrolled,
}

impl GlucoseLevel {
    pub fn from_glucose(glucose: f64) -> Self {
        if glucose < 140.0 {
            Self::Controlled
        } else if glucose <= 199.0 {
            Self::Prediabetic
        } else {
            Self::Uncontrolled
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Controlled => "Controlled",
            Self::Prediabetic => "Prediabetic",
            Self::Uncontrolled => "Uncontrolled",
        }
    }
}

pub const AT_RISK: &str = "⚠ At Risk";
pub const LOW_RISK: &str = "✅ Low Risk";

/// Body returned by `POST /predict`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RiskReport {
    pub heart_risk: String,
    pub diabetes: String,
    pub stroke_risk: String,
    pub bp_category: String,
}

impl RiskReport {
    pub fn new(features: &PatientFeatures, heart: bool, stroke: bool, diabetes: bool) -> Self {
        let diabetes = if diabetes {
            format!("{} ({})", AT_RISK, features.glucose_level().label())
        } else {
            LOW_RISK.to_string()
        };

        RiskReport {
            heart_risk: risk_label(heart).to_string(),
            diabetes,
            stroke_risk: risk_label(stroke).to_string(),
            bp_category: features.blood_pressure().label().to_string(),
        }
    }
}

fn risk_label(at_risk: bool) -> &'static str {
    if at_risk {
        AT_RISK
    } else {
        LOW_RISK
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn timed(mut self, elapsed_ms: u64) -> Self {
        self.execution_time_ms = Some(elapsed_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> HealthInput {
        HealthInput {
            age: "54".into(),
            gender: "Male".into(),
            systolic: "142".into(),
            diastolic: "85".into(),
            cholesterol: "230.5".into(),
            glucose: "150".into(),
            bmi: "27.4".into(),
            smoking: "YES".into(),
        }
    }

    #[test]
    fn parse_encodes_categoricals_case_insensitively() {
        let f = input().parse().unwrap();
        assert_eq!(f.age, 54);
        assert!(f.male);
        assert!(f.smoker);
        assert!(f.hypertensive());

        let mut other = input();
        other.gender = "female".into();
        other.smoking = "no".into();
        let f = other.parse().unwrap();
        assert!(!f.male);
        assert!(!f.smoker);
    }

    #[test]
    fn parse_rejects_fractional_integers_and_names_the_field() {
        let mut bad = input();
        bad.systolic = "120.5".into();
        match bad.parse() {
            Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "systolic"),
            other => panic!("unexpected: {:?}", other),
        }

        let mut empty = input();
        empty.bmi = String::new();
        assert!(empty.parse().is_err());
    }

    #[test]
    fn parse_trims_whitespace() {
        let mut padded = input();
        padded.age = " 61 ".into();
        assert_eq!(padded.parse().unwrap().age, 61);
    }

    #[test]
    fn feature_vectors_follow_model_layouts() {
        let f = input().parse().unwrap();
        assert_eq!(
            f.heart_features(),
            vec![54.0, 1.0, 230.5, 142.0, 85.0, 27.4, 1.0]
        );
        assert_eq!(
            f.stroke_features(),
            vec![1.0, 54.0, 1.0, 0.0, 150.0, 1.0, 27.4, 0.0, 0.0]
        );
        assert_eq!(
            f.diabetes_features(),
            vec![0.0, 150.0, 0.0, 0.0, 0.0, 27.4, 0.0, 54.0]
        );
    }

    #[test]
    fn blood_pressure_boundaries() {
        use BloodPressureCategory::*;
        assert_eq!(BloodPressureCategory::from_reading(119, 79), Normal);
        assert_eq!(BloodPressureCategory::from_reading(120, 79), Elevated);
        assert_eq!(BloodPressureCategory::from_reading(129, 70), Elevated);
        assert_eq!(BloodPressureCategory::from_reading(130, 70), HypertensionStage1);
        assert_eq!(BloodPressureCategory::from_reading(110, 80), HypertensionStage1);
        assert_eq!(BloodPressureCategory::from_reading(140, 70), HypertensionStage2);
        assert_eq!(BloodPressureCategory::from_reading(110, 120), HypertensionStage2);
        assert_eq!(BloodPressureCategory::from_reading(181, 70), HypertensiveCrisis);
        assert_eq!(BloodPressureCategory::from_reading(100, 121), HypertensiveCrisis);
        assert_eq!(HypertensionStage1.label(), "Hypertension Stage 1");
    }

    #[test]
    fn glucose_levels() {
        assert_eq!(GlucoseLevel::from_glucose(139.9), GlucoseLevel::Controlled);
        assert_eq!(GlucoseLevel::from_glucose(140.0), GlucoseLevel::Prediabetic);
        assert_eq!(GlucoseLevel::from_glucose(199.0), GlucoseLevel::Prediabetic);
        assert_eq!(GlucoseLevel::from_glucose(199.5), GlucoseLevel::Uncontrolled);
    }

    #[test]
    fn glucose_level_uses_full_precision_near_boundaries() {
        let level = |raw: &str| {
            let mut i = input();
            i.glucose = raw.into();
            i.parse().unwrap().glucose_level()
        };
        assert_eq!(level("139.999999"), GlucoseLevel::Controlled);
        assert_eq!(level("140"), GlucoseLevel::Prediabetic);
        assert_eq!(level("199"), GlucoseLevel::Prediabetic);
        assert_eq!(level("199.000001"), GlucoseLevel::Uncontrolled);
    }

    #[test]
    fn report_labels() {
        let f = input().parse().unwrap();
        let report = RiskReport::new(&f, true, false, true);
        assert_eq!(report.heart_risk, "⚠ At Risk");
        assert_eq!(report.stroke_risk, "✅ Low Risk");
        assert_eq!(report.diabetes, "⚠ At Risk (Prediabetic)");
        assert_eq!(report.bp_category, "Hypertension Stage 1");

        let report = RiskReport::new(&f, false, false, false);
        assert_eq!(report.diabetes, "✅ Low Risk");
    }
}
