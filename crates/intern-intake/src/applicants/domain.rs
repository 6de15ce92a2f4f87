use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::forms::ApplicantFormData;

/// Identifier wrapper for stored applicants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

impl ApplicantId {
    /// Identifier for the `sequence`-th applicant of a store.
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("apl-{sequence:06}"))
    }
}

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review stage of an application. Records only ever move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicantStatus {
    #[default]
    Pending,
    Shortlisted,
    Approved,
    Rejected,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "Pending",
            ApplicantStatus::Shortlisted => "Shortlisted",
            ApplicantStatus::Approved => "Approved",
            ApplicantStatus::Rejected => "Rejected",
        }
    }

    pub fn can_transition_to(self, next: ApplicantStatus) -> bool {
        matches!(
            (self, next),
            (ApplicantStatus::Pending, ApplicantStatus::Shortlisted)
                | (ApplicantStatus::Shortlisted, ApplicantStatus::Approved)
                | (ApplicantStatus::Pending, ApplicantStatus::Rejected)
                | (ApplicantStatus::Shortlisted, ApplicantStatus::Rejected)
        )
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown applicant status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicantStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicantStatus::Pending),
            "shortlisted" => Ok(ApplicantStatus::Shortlisted),
            "approved" => Ok(ApplicantStatus::Approved),
            "rejected" => Ok(ApplicantStatus::Rejected),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

/// Internship term, derived from the submission month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    Summer,
    Winter,
}

impl Term {
    /// January to June is the summer intake, everything later the winter intake.
    pub fn for_date(date: DateTime<Utc>) -> Self {
        if date.month() <= 6 {
            Term::Summer
        } else {
            Term::Winter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaCategory {
    General,
    Reserved,
}

impl QuotaCategory {
    /// Blank and GEN/GENERAL are the general quota; any other category is reserved.
    pub fn from_category(category: Option<&str>) -> Self {
        let category = category.unwrap_or_default().trim().to_ascii_uppercase();
        match category.as_str() {
            "" | "GEN" | "GENERAL" => QuotaCategory::General,
            _ => QuotaCategory::Reserved,
        }
    }
}

/// Everything an applicant (or a CSV import row) provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantSubmission {
    pub submission_timestamp: Option<DateTime<Utc>>,
    pub email: String,
    pub instruction_acknowledged: Option<String>,
    pub training_acknowledgement: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub mobile_no: Option<String>,
    pub email2: Option<String>,
    pub father_mother_name: Option<String>,
    pub father_mother_occupation: Option<String>,
    pub parent_mobile_no: Option<String>,
    pub present_institute: Option<String>,
    pub areas_of_training: Option<String>,
    pub present_semester: Option<String>,
    #[serde(rename = "lastSemesterSGPA", deserialize_with = "lenient_f64")]
    pub last_semester_sgpa: Option<f64>,
    #[serde(rename = "percentageIn10Plus2", deserialize_with = "lenient_f64")]
    pub percentage_in_10_plus_2: Option<f64>,
    pub declaration01: Option<String>,
    pub declaration02: Option<String>,
    pub declaration03: Option<String>,
    pub designation: Option<String>,
    pub cpf: String,
    pub section: Option<String>,
    pub location: Option<String>,
    pub mentor_mobile_no: Option<String>,
    pub mentor_details_available: Option<String>,
    pub guardian_occupation_details: Option<String>,
    #[serde(rename = "mentorCPF")]
    pub mentor_cpf: Option<String>,
    pub mentor_name: Option<String>,
    pub mentor_designation: Option<String>,
    pub mentor_section: Option<String>,
    pub mentor_location: Option<String>,
    pub mentor_email: Option<String>,
    pub preference_criteria: Option<String>,
    pub referred_by: Option<String>,
    pub late_application: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(number)) => Ok(Some(number)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("'{text}' is not a number"))),
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_f64(deserializer)? {
        None => Ok(None),
        Some(number) if number.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&number) => {
            Ok(Some(number as u32))
        }
        Some(number) => Err(D::Error::custom(format!(
            "'{number}' is not a whole number"
        ))),
    }
}

/// Stored application with the fields computed at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    pub registration_number: String,
    #[serde(flatten)]
    pub details: ApplicantSubmission,
    pub status: ApplicantStatus,
    pub term: Term,
    pub quota_category: QuotaCategory,
    pub upload_date: DateTime<Utc>,
    pub processed_by: Option<String>,
}

fn number<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|value| value.to_string())
}

impl ApplicantRecord {
    /// Values printed on the application form.
    pub fn form_data(&self) -> ApplicantFormData {
        let details = &self.details;
        ApplicantFormData {
            name: Some(details.name.clone()),
            age: number(details.age),
            gender: details.gender.clone(),
            category: details.category.clone(),
            address: details.address.clone(),
            mobile_no: details.mobile_no.clone(),
            email: Some(details.email.clone()),
            father_mother_name: details.father_mother_name.clone(),
            father_mother_occupation: details.father_mother_occupation.clone(),
            parent_mobile_no: details.parent_mobile_no.clone(),
            present_institute: details.present_institute.clone(),
            areas_of_training: details.areas_of_training.clone(),
            present_semester: details.present_semester.clone(),
            last_semester_sgpa: number(details.last_semester_sgpa),
            percentage_in_10_plus_2: number(details.percentage_in_10_plus_2),
            designation: details.designation.clone(),
            cpf: Some(details.cpf.clone()),
            section: details.section.clone(),
            location: details.location.clone(),
        }
    }
}
