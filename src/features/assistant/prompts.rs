//! Prompt templates for the two assistant actions

use anyhow::{anyhow, Result};
use std::fmt;

/// Appended to every vitals analysis
pub const ANALYSIS_DISCLAIMER: &str = "This analysis is for informational purposes only and is not a substitute for professional medical advice. Always consult your doctor about your readings.";

/// Returned in place of any response when the service call fails
pub const FALLBACK_RESPONSE: &str =
    "Could not retrieve information. Please check your connection or API key and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SugarReadingType {
    #[default]
    Fasting,
    AfterMeal,
}

impl SugarReadingType {
    pub fn label(&self) -> &'static str {
        match self {
            SugarReadingType::Fasting => "Fasting",
            SugarReadingType::AfterMeal => "After Meal",
        }
    }
}

impl fmt::Display for SugarReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for SugarReadingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "fasting" => Ok(SugarReadingType::Fasting),
            "aftermeal" | "postmeal" => Ok(SugarReadingType::AfterMeal),
            other => Err(anyhow!("Unknown sugar reading type: {} (use fasting or after-meal)", other)),
        }
    }
}

/// One set of vitals entered by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReadings {
    pub systolic: u32,
    pub diastolic: u32,
    /// mg/dL
    pub blood_sugar: u32,
    pub reading_type: SugarReadingType,
}

pub fn medicine_info_prompt(medicine_name: &str) -> String {
    format!(
        "For the medicine \"{}\", please provide the following information in a simple, \
easy-to-understand format suitable for a patient or caretaker:\n\
1. **Primary Use**: What is this medicine for?\n\
2. **Common Side Effects**: List the most common side effects.\n\
3. **Potential Drug Interactions**: What are some common or important drugs it might interact with?\n\
Please start each section with a clear heading.",
        medicine_name.trim()
    )
}

pub fn vitals_prompt(readings: &HealthReadings) -> String {
    format!(
        "Act as a helpful medical assistant. Analyze the following health readings for a patient \
and provide a simple, easy-to-understand explanation.\n\n\
Readings:\n\
- Blood Pressure: {} / {} mmHg\n\
- Blood Sugar: {} mg/dL ({})\n\n\
Please provide the analysis in the following structure:\n\
1. **Blood Pressure**: Briefly explain what the numbers mean (e.g., normal, elevated, high).\n\
2. **Blood Sugar**: Briefly explain what the number means based on whether it was fasting or after a meal.\n\
3. **General Advice**: Provide 2-3 general, non-prescriptive lifestyle tips that could be helpful \
(e.g., related to diet, exercise, monitoring). Do not give specific medical advice or tell them to change medications.\n\n\
IMPORTANT: Conclude the entire response with the following disclaimer, exactly as written: \"{}\"",
        readings.systolic,
        readings.diastolic,
        readings.blood_sugar,
        readings.reading_type,
        ANALYSIS_DISCLAIMER
    )
}
