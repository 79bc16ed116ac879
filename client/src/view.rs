//! Explicit stand-in for the host page: form controls, the loading and
//! result regions, and the four result lines.

use std::fmt;

use crate::payload::{display_value, HealthInput, HealthPrediction};

/// Identifiers of every element the handlers touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    HealthForm,
    Age,
    Gender,
    Systolic,
    Diastolic,
    Cholesterol,
    Glucose,
    Bmi,
    Smoking,
    Loading,
    Result,
    HeartRisk,
    Diabetes,
    StrokeRisk,
    BpCategory,
    ResetBtn,
}

impl ElementId {
    /// The eight form controls, in form order.
    pub const FIELDS: [ElementId; 8] = [
        ElementId::Age,
        ElementId::Gender,
        ElementId::Systolic,
        ElementId::Diastolic,
        ElementId::Cholesterol,
        ElementId::Glucose,
        ElementId::Bmi,
        ElementId::Smoking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::HealthForm => "healthForm",
            ElementId::Age => "age",
            ElementId::Gender => "gender",
            ElementId::Systolic => "systolic",
            ElementId::Diastolic => "diastolic",
            ElementId::Cholesterol => "cholesterol",
            ElementId::Glucose => "glucose",
            ElementId::Bmi => "bmi",
            ElementId::Smoking => "smoking",
            ElementId::Loading => "loading",
            ElementId::Result => "result",
            ElementId::HeartRisk => "heart_risk",
            ElementId::Diabetes => "diabetes",
            ElementId::StrokeRisk => "stroke_risk",
            ElementId::BpCategory => "bp_category",
            ElementId::ResetBtn => "resetBtn",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text control with the value it resets to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormControl {
    pub value: String,
    pub default_value: String,
}

impl FormControl {
    pub fn with_default(default_value: impl Into<String>) -> Self {
        let default_value = default_value.into();
        Self {
            value: default_value.clone(),
            default_value,
        }
    }
}

/// A region whose visibility is driven by the `hidden` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    hidden: bool,
}

impl Panel {
    pub fn hidden() -> Self {
        Self { hidden: true }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn add_hidden(&mut self) {
        self.hidden = true;
    }

    pub fn remove_hidden(&mut self) {
        self.hidden = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthForm {
    pub age: FormControl,
    pub gender: FormControl,
    pub systolic: FormControl,
    pub diastolic: FormControl,
    pub cholesterol: FormControl,
    pub glucose: FormControl,
    pub bmi: FormControl,
    pub smoking: FormControl,
}

impl Default for HealthForm {
    fn default() -> Self {
        // Selects start on their first option.
        Self {
            age: FormControl::default(),
            gender: FormControl::with_default("Male"),
            systolic: FormControl::default(),
            diastolic: FormControl::default(),
            cholesterol: FormControl::default(),
            glucose: FormControl::default(),
            bmi: FormControl::default(),
            smoking: FormControl::with_default("No"),
        }
    }
}

impl HealthForm {
    pub fn control(&self, id: ElementId) -> Option<&FormControl> {
        Some(match id {
            ElementId::Age => &self.age,
            ElementId::Gender => &self.gender,
            ElementId::Systolic => &self.systolic,
            ElementId::Diastolic => &self.diastolic,
            ElementId::Cholesterol => &self.cholesterol,
            ElementId::Glucose => &self.glucose,
            ElementId::Bmi => &self.bmi,
            ElementId::Smoking => &self.smoking,
            _ => return None,
        })
    }

    pub fn control_mut(&mut self, id: ElementId) -> Option<&mut FormControl> {
        Some(match id {
            ElementId::Age => &mut self.age,
            ElementId::Gender => &mut self.gender,
            ElementId::Systolic => &mut self.systolic,
            ElementId::Diastolic => &mut self.diastolic,
            ElementId::Cholesterol => &mut self.cholesterol,
            ElementId::Glucose => &mut self.glucose,
            ElementId::Bmi => &mut self.bmi,
            ElementId::Smoking => &mut self.smoking,
            _ => return None,
        })
    }

    /// Snapshot of the current values, unchecked.
    pub fn read(&self) -> HealthInput {
        HealthInput {
            age: self.age.value.clone(),
            gender: self.gender.value.clone(),
            systolic: self.systolic.value.clone(),
            diastolic: self.diastolic.value.clone(),
            cholesterol: self.cholesterol.value.clone(),
            glucose: self.glucose.value.clone(),
            bmi: self.bmi.value.clone(),
            smoking: self.smoking.value.clone(),
        }
    }

    pub fn reset(&mut self) {
        for id in ElementId::FIELDS {
            if let Some(control) = self.control_mut(id) {
                control.value = control.default_value.clone();
            }
        }
    }
}

/// Prefixes written in front of each returned value.
pub const HEART_PREFIX: &str = "❤️ Heart Disease: ";
pub const DIABETES_PREFIX: &str = "💉 Diabetes: ";
pub const STROKE_PREFIX: &str = "🧠 Stroke: ";
pub const BP_PREFIX: &str = "💓 Blood Pressure: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub form: HealthForm,
    pub loading: Panel,
    pub result: Panel,
    pub heart_risk: String,
    pub diabetes: String,
    pub stroke_risk: String,
    pub bp_category: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            form: HealthForm::default(),
            loading: Panel::hidden(),
            result: Panel::hidden(),
            heart_risk: String::new(),
            diabetes: String::new(),
            stroke_risk: String::new(),
            bp_category: String::new(),
        }
    }
}

impl ViewState {
    /// Sets a control's current value. Returns false for non-field ids.
    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) -> bool {
        match self.form.control_mut(id) {
            Some(control) => {
                control.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        match id {
            ElementId::HeartRisk => Some(&self.heart_risk),
            ElementId::Diabetes => Some(&self.diabetes),
            ElementId::StrokeRisk => Some(&self.stroke_risk),
            ElementId::BpCategory => Some(&self.bp_category),
            other => self.form.control(other).map(|c| c.value.as_str()),
        }
    }

    pub fn show_loading(&mut self) {
        self.loading.remove_hidden();
        self.result.add_hidden();
    }

    pub fn render_prediction(&mut self, prediction: &HealthPrediction) {
        self.heart_risk = format!("{}{}", HEART_PREFIX, display_value(prediction.heart_risk.as_ref()));
        self.diabetes = format!("{}{}", DIABETES_PREFIX, display_value(prediction.diabetes.as_ref()));
        self.stroke_risk = format!("{}{}", STROKE_PREFIX, display_value(prediction.stroke_risk.as_ref()));
        self.bp_category = format!("{}{}", BP_PREFIX, display_value(prediction.bp_category.as_ref()));

        self.loading.add_hidden();
        self.result.remove_hidden();
    }

    pub fn render_failure(&mut self) {
        self.loading.add_hidden();
    }

    pub fn reset(&mut self) {
        self.form.reset();
        self.result.add_hidden();
    }
}
