//! AI assistant command handlers
//!
//! Handles: drug-info, vitals
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::features::assistant::{HealthReadings, SugarReadingType};

pub struct AssistantHandler;

#[async_trait]
impl CommandHandler for AssistantHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["drug-info", "vitals"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "drug-info" => {
                let name = invocation.rest_from(0);
                if name.trim().is_empty() {
                    bail!("Missing medicine name parameter");
                }
                Ok(ctx.assistant.medicine_info(&name).await)
            }
            "vitals" => {
                let readings = parse_readings(invocation)?;
                Ok(ctx.assistant.analyze_readings(&readings).await)
            }
            other => Err(anyhow!("AssistantHandler cannot handle '{}'", other)),
        }
    }
}

/// `vitals <systolic>/<diastolic> <blood sugar> [fasting|after-meal]`
fn parse_readings(invocation: &CommandInvocation) -> Result<HealthReadings> {
    let pressure = invocation.require(0, "blood pressure")?;
    let (systolic, diastolic) = pressure
        .split_once('/')
        .ok_or_else(|| anyhow!("Blood pressure must look like 120/80"))?;
    let number = |raw: &str, what: &str| -> Result<u32> {
        raw.trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {} '{}': {}", what, raw, e))
    };

    let reading_type = match invocation.arg(2) {
        Some(_) => invocation.rest_from(2).parse()?,
        None => SugarReadingType::Fasting,
    };

    Ok(HealthReadings {
        systolic: number(systolic, "systolic")?,
        diastolic: number(diastolic, "diastolic")?,
        blood_sugar: invocation.parse_arg(1, "blood sugar")?,
        reading_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::test_context;
    use crate::features::assistant::ANALYSIS_DISCLAIMER;

    fn readings(line: &str) -> Result<HealthReadings> {
        parse_readings(&CommandInvocation::parse(line).unwrap())
    }

    #[test]
    fn test_parse_readings() {
        let parsed = readings("vitals 128/84 142 after meal").unwrap();
        assert_eq!(
            parsed,
            HealthReadings {
                systolic: 128,
                diastolic: 84,
                blood_sugar: 142,
                reading_type: SugarReadingType::AfterMeal,
            }
        );
        assert_eq!(readings("vitals 120/80 95").unwrap().reading_type, SugarReadingType::Fasting);
    }

    #[test]
    fn test_parse_readings_errors() {
        assert!(readings("vitals 120 95").is_err());
        assert!(readings("vitals 120/eighty 95").is_err());
        assert!(readings("vitals 120/80").is_err());
        assert!(readings("vitals 120/80 95 lunch").is_err());
    }

    #[tokio::test]
    async fn test_vitals_reply_has_disclaimer() {
        let ctx = test_context().await;
        let invocation = CommandInvocation::parse("vitals 120/80 95 fasting").unwrap();
        let reply = AssistantHandler.handle(ctx, &invocation).await.unwrap();
        assert!(reply.ends_with(ANALYSIS_DISCLAIMER));
    }

    #[tokio::test]
    async fn test_drug_info_needs_name() {
        let ctx = test_context().await;
        let missing = CommandInvocation::parse("drug-info").unwrap();
        assert!(AssistantHandler.handle(ctx.clone(), &missing).await.is_err());

        let named = CommandInvocation::parse("drug-info Vitamin D").unwrap();
        let reply = AssistantHandler.handle(ctx, &named).await.unwrap();
        assert!(reply.contains("Primary Use"));
    }
}
