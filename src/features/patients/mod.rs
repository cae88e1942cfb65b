//! # Patients Feature
//!
//! Client-side patient identifiers: prefix validation at login and id
//! generation at signup. There is no identity backend.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::{bail, Result};
use rand::Rng;
use regex::Regex;

/// Every valid patient id starts with this (case-insensitive)
pub const PATIENT_ID_PREFIX: &str = "MEDIMATE-";

/// Characters of the sanitized name kept in a generated id
const NAME_SEGMENT_LEN: usize = 8;

/// Check a typed-in patient id and return it trimmed
pub fn validate_patient_id(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if !trimmed.to_uppercase().starts_with(PATIENT_ID_PREFIX) {
        bail!("Invalid Patient ID. It should start with {PATIENT_ID_PREFIX}");
    }
    Ok(trimmed.to_string())
}

/// Build a new id of the form `MEDIMATE-<NAME>-<NNNN>`
pub fn generate_patient_id<R: Rng>(patient_name: &str, rng: &mut R) -> Result<String> {
    let sanitized = Regex::new(r"[^a-zA-Z0-9]")?
        .replace_all(patient_name.trim(), "")
        .to_uppercase();
    if sanitized.is_empty() {
        bail!("Patient name must contain at least one letter or digit");
    }

    let name_segment: String = sanitized.chars().take(NAME_SEGMENT_LEN).collect();
    let suffix: u32 = rng.random_range(1000..=9999);
    Ok(format!("{PATIENT_ID_PREFIX}{name_segment}-{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validate_accepts_prefix_any_case() {
        assert_eq!(
            validate_patient_id("  medimate-jane-1234 ").unwrap(),
            "medimate-jane-1234"
        );
        assert!(validate_patient_id("MEDIMATE-X").is_ok());
    }

    #[test]
    fn test_validate_rejects_other_ids() {
        assert!(validate_patient_id("").is_err());
        assert!(validate_patient_id("MEDI-MATE-1").is_err());
        assert!(validate_patient_id("patient-MEDIMATE-1").is_err());
    }

    #[test]
    fn test_generate_sanitizes_and_truncates() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_patient_id("Mary-Anne O'Sullivan", &mut rng).unwrap();
        assert!(id.starts_with("MEDIMATE-MARYANNE-"), "got {id}");

        let suffix: u32 = id.rsplit('-').next().unwrap().parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
        assert!(validate_patient_id(&id).is_ok());
    }

    #[test]
    fn test_generate_short_name() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = generate_patient_id("bo", &mut rng).unwrap();
        assert!(id.starts_with("MEDIMATE-BO-"));
    }

    #[test]
    fn test_generate_rejects_empty_name() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_patient_id("   ", &mut rng).is_err());
        assert!(generate_patient_id("!!!", &mut rng).is_err());
    }
}
