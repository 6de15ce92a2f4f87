//! Display helpers that turn raw applicant values into bilingual strings.

use std::fmt::Display;

use serde::Serialize;
use serde_json::{Map, Value};

use super::layout::FormField;

const AGE_SUFFIX: &str = "वर्ष / years";

/// `"<value> वर्ष / years"`, or an empty string when there is nothing to show.
pub fn format_age<T: Display>(value: Option<T>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let raw = value.to_string();
    let numeric = raw.trim();
    if numeric.is_empty() {
        return String::new();
    }
    format!("{numeric} {AGE_SUFFIX}")
}

/// Map an English gender to its bilingual label. Unknown values pass through untouched.
pub fn format_gender<T: Display>(value: Option<T>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let raw = value.to_string();
    if raw.is_empty() {
        return raw;
    }
    match raw.trim().to_lowercase().as_str() {
        "female" => "महिला / Female".to_string(),
        "male" => "पुरुष / Male".to_string(),
        "other" | "others" => "अन्य / Other".to_string(),
        _ => raw,
    }
}

/// Map a reservation category abbreviation to its bilingual label. Unknown values pass
/// through untouched.
pub fn format_category<T: Display>(value: Option<T>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let raw = value.to_string();
    if raw.is_empty() {
        return raw;
    }
    // SC and ST keep the leading space present on the printed reference form.
    match raw.trim().to_uppercase().as_str() {
        "GEN" | "GENERAL" => "सामान्य / General".to_string(),
        "OBC" => "अन्य पिछड़ा वर्ग / OBC".to_string(),
        "SC" => " अनुसूचित जाति / SC".to_string(),
        "ST" => " अनुसूचित जनजाति / ST".to_string(),
        _ => raw,
    }
}

/// Applicant values the application form can print.
///
/// Deserialization is lenient: the canonical camelCase keys are read first, then the
/// legacy aliases older clients send; numbers and booleans become strings and `null` is
/// treated as absent. Nothing here fails on malformed values, it only leaves the slot blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct ApplicantFormData {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub mobile_no: Option<String>,
    pub email: Option<String>,
    pub father_mother_name: Option<String>,
    pub father_mother_occupation: Option<String>,
    pub parent_mobile_no: Option<String>,
    pub present_institute: Option<String>,
    pub areas_of_training: Option<String>,
    pub present_semester: Option<String>,
    #[serde(rename = "lastSemesterSGPA")]
    pub last_semester_sgpa: Option<String>,
    #[serde(rename = "percentageIn10Plus2")]
    pub percentage_in_10_plus_2: Option<String>,
    pub designation: Option<String>,
    pub cpf: Option<String>,
    pub section: Option<String>,
    pub location: Option<String>,
}

impl From<Value> for ApplicantFormData {
    /// Anything other than a JSON object carries no printable values.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from(map),
            _ => Self::default(),
        }
    }
}

impl From<Map<String, Value>> for ApplicantFormData {
    fn from(map: Map<String, Value>) -> Self {
        let pick = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|key| map.get(*key).and_then(coerce_text))
                .find(|value| !value.is_empty())
        };

        Self {
            name: pick(&["name"]),
            age: pick(&["age"]),
            gender: pick(&["gender"]),
            category: pick(&["category"]),
            address: pick(&["address"]),
            mobile_no: pick(&["mobileNo", "mobile"]),
            email: pick(&["email"]),
            father_mother_name: pick(&["fatherMotherName", "father"]),
            father_mother_occupation: pick(&["fatherMotherOccupation", "father_occupation"]),
            parent_mobile_no: pick(&["parentMobileNo", "father-phone"]),
            present_institute: pick(&["presentInstitute", "college"]),
            areas_of_training: pick(&["areasOfTraining", "course"]),
            present_semester: pick(&["presentSemester", "semester"]),
            last_semester_sgpa: pick(&["lastSemesterSGPA", "cgpa"]),
            percentage_in_10_plus_2: pick(&["percentageIn10Plus2", "percentage"]),
            designation: pick(&["designation"]),
            cpf: pick(&["cpf"]),
            section: pick(&["section"]),
            location: pick(&["location"]),
        }
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

/// Read-only view over formatted applicant values, keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedFieldSet {
    data: ApplicantFormData,
}

impl FormattedFieldSet {
    pub fn data(&self) -> &ApplicantFormData {
        &self.data
    }

    /// The printable value for `field`; blank values count as absent.
    pub fn value(&self, field: FormField) -> Option<&str> {
        let data = &self.data;
        let slot = match field {
            FormField::Name => &data.name,
            FormField::Age => &data.age,
            FormField::RegistrationNumber => return None,
            FormField::Gender => &data.gender,
            FormField::Category => &data.category,
            FormField::Address => &data.address,
            FormField::MobileNo => &data.mobile_no,
            FormField::Email => &data.email,
            FormField::ParentName => &data.father_mother_name,
            FormField::ParentOccupation => &data.father_mother_occupation,
            FormField::ParentMobileNo => &data.parent_mobile_no,
            FormField::Course => &data.areas_of_training,
            FormField::Semester => &data.present_semester,
            FormField::LastSemesterSgpa => &data.last_semester_sgpa,
            FormField::PercentageTwelfth => &data.percentage_in_10_plus_2,
            FormField::Institute => &data.present_institute,
            FormField::Designation => &data.designation,
            FormField::Cpf => &data.cpf,
            FormField::Section => &data.section,
            FormField::Location => &data.location,
        };
        slot.as_deref().filter(|value| !value.trim().is_empty())
    }
}

/// Copy of `applicant` with age, gender and category replaced by their bilingual forms.
/// Every other field is carried over unchanged.
pub fn format_applicant_data(applicant: &ApplicantFormData) -> FormattedFieldSet {
    let mut data = applicant.clone();

    if let Some(age) = applicant.age.as_deref() {
        data.age = Some(format_age(Some(age)));
    }
    if let Some(gender) = applicant.gender.as_deref().filter(|value| !value.is_empty()) {
        data.gender = Some(format_gender(Some(gender)));
    }
    if let Some(category) = applicant.category.as_deref().filter(|value| !value.is_empty()) {
        data.category = Some(format_category(Some(category)));
    }

    FormattedFieldSet { data }
}
