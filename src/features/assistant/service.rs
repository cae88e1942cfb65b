//! Drug information and vitals analysis on top of a TextGenerator

use log::{error, info};
use std::sync::Arc;

use super::prompts::{
    medicine_info_prompt, vitals_prompt, HealthReadings, ANALYSIS_DISCLAIMER, FALLBACK_RESPONSE,
};
use super::providers::TextGenerator;

pub struct AiAssistant {
    generator: Arc<dyn TextGenerator>,
}

impl AiAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        AiAssistant { generator }
    }

    /// Primary use, side effects and interactions for a medicine.
    /// Never fails: errors come back as the fallback text.
    pub async fn medicine_info(&self, medicine_name: &str) -> String {
        info!("Fetching medicine info for {}", medicine_name.trim());
        match self.generator.generate(&medicine_info_prompt(medicine_name)).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error fetching medicine info: {e}");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }

    /// Plain-language reading of blood pressure and blood sugar, always
    /// ending with the disclaimer
    pub async fn analyze_readings(&self, readings: &HealthReadings) -> String {
        info!(
            "Analyzing readings: BP {}/{}, sugar {} ({})",
            readings.systolic, readings.diastolic, readings.blood_sugar, readings.reading_type
        );
        match self.generator.generate(&vitals_prompt(readings)).await {
            Ok(text) => with_disclaimer(text),
            Err(e) => {
                error!("Error analyzing health readings: {e}");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }
}

fn with_disclaimer(text: String) -> String {
    if text.contains(ANALYSIS_DISCLAIMER) {
        text
    } else {
        format!("{}\n\n{}", text.trim_end(), ANALYSIS_DISCLAIMER)
    }
}
