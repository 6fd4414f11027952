use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Canonical, reconciled view of one user's editable professional data.
///
/// Every field has exactly one storage path here; legacy document shapes are
/// only ever read by the field normalizer.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub full_name: String,
    pub headline: String,
    pub about: String,
    pub location: String,
    pub website: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub certifications: Vec<Certification>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EmploymentType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    Freelance,
    Contract,
    Internship,
    Apprenticeship,
    Seasonal,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 8] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::SelfEmployed,
        EmploymentType::Freelance,
        EmploymentType::Contract,
        EmploymentType::Internship,
        EmploymentType::Apprenticeship,
        EmploymentType::Seasonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::SelfEmployed => "Self-employed",
            EmploymentType::Freelance => "Freelance",
            EmploymentType::Contract => "Contract",
            EmploymentType::Internship => "Internship",
            EmploymentType::Apprenticeship => "Apprenticeship",
            EmploymentType::Seasonal => "Seasonal",
        }
    }

    /// Matches labels loosely: "full time", "FULL_TIME" and "Full-time" are the same.
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = squash(label);
        Self::ALL
            .into_iter()
            .find(|kind| squash(kind.as_str()) == wanted)
    }
}

fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    pub employment_type: EmploymentType,
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
    pub skills_used: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(alias = "_id")]
    pub id: String,
    pub school: String,
    pub degree: String,
    pub field: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub grade: Option<String>,
    pub activities: Option<String>,
    pub description: Option<String>,
}

/// Skill proficiency on a 1..=5 scale.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Proficiency(pub u8);

impl Proficiency {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const ADVANCED: Proficiency = Proficiency(3);

    const LABELS: [&'static str; 5] = ["Beginner", "Intermediate", "Advanced", "Expert", "Master"];

    pub fn is_valid(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }

    pub fn label(&self) -> &'static str {
        if self.is_valid() {
            Self::LABELS[(self.0 - 1) as usize]
        } else {
            "Unknown"
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::LABELS
            .iter()
            .position(|l| l.to_lowercase() == wanted)
            .map(|idx| Proficiency(idx as u8 + 1))
    }

    pub fn clamped(level: i64) -> Self {
        Proficiency(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }
}

impl Default for Proficiency {
    fn default() -> Self {
        Self::ADVANCED
    }
}

/// A labeled competency. Bare-string skills from older documents are lifted
/// into this shape by the normalizer.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    pub name: String,
    pub proficiency: Proficiency,
    pub description: String,
}

impl Skill {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub issuing_organization: String,
    #[serde(deserialize_with = "lenient_date")]
    pub issue_date: Option<NaiveDate>,
    pub does_not_expire: bool,
    #[serde(deserialize_with = "lenient_date")]
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
}

/// Editable header fields shown at the top of the profile page.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileHeader {
    pub full_name: String,
    pub headline: String,
    pub location: String,
    pub website: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AboutSection {
    pub about: String,
}

impl Profile {
    pub fn header(&self) -> ProfileHeader {
        ProfileHeader {
            full_name: self.full_name.clone(),
            headline: self.headline.clone(),
            location: self.location.clone(),
            website: self.website.clone(),
        }
    }

    pub fn set_header(&mut self, header: ProfileHeader) {
        self.full_name = header.full_name;
        self.headline = header.headline;
        self.location = header.location;
        self.website = header.website;
    }

    pub fn about_section(&self) -> AboutSection {
        AboutSection {
            about: self.about.clone(),
        }
    }
}

/// Parses the date shapes seen across backend generations: plain
/// `YYYY-MM-DD`, RFC 3339 timestamps and month-only `YYYY-MM`.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    // "2021-06" means the first of that month
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date_lenient))
}

/// True when an optional text field carries something worth showing.
pub fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employment_type_parses_loose_labels() {
        assert_eq!(EmploymentType::parse("full time"), Some(EmploymentType::FullTime));
        assert_eq!(EmploymentType::parse("SELF_EMPLOYED"), Some(EmploymentType::SelfEmployed));
        assert_eq!(EmploymentType::parse("Internship"), Some(EmploymentType::Internship));
        assert_eq!(EmploymentType::parse("astronaut"), None);
    }

    #[test]
    fn employment_type_serializes_as_display_label() {
        let value = serde_json::to_value(EmploymentType::FullTime).unwrap();
        assert_eq!(value, json!("Full-time"));
    }

    #[test]
    fn proficiency_defaults_to_advanced() {
        assert_eq!(Proficiency::default(), Proficiency(3));
        assert_eq!(Proficiency::default().label(), "Advanced");
        assert_eq!(Proficiency::from_label(" expert "), Some(Proficiency(4)));
        assert_eq!(Proficiency::clamped(9), Proficiency(5));
        assert_eq!(Proficiency::clamped(-2), Proficiency(1));
    }

    #[test]
    fn parses_dates_from_every_backend_generation() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 1);
        assert_eq!(parse_date_lenient("2023-01-01"), expected);
        assert_eq!(parse_date_lenient("2023-01-01T00:00:00.000Z"), expected);
        assert_eq!(parse_date_lenient("2023-01"), expected);
        assert_eq!(parse_date_lenient(""), None);
        assert_eq!(parse_date_lenient("someday"), None);
    }

    #[test]
    fn experience_deserializes_with_missing_fields_and_mongo_id() {
        let exp: Experience = serde_json::from_value(json!({
            "_id": "abc",
            "title": "Engineer",
            "startDate": "2020-02-03T10:00:00Z",
            "endDate": ""
        }))
        .unwrap();

        assert_eq!(exp.id, "abc");
        assert_eq!(exp.employment_type, EmploymentType::FullTime);
        assert_eq!(exp.start_date, NaiveDate::from_ymd_opt(2020, 2, 3));
        assert_eq!(exp.end_date, None);
        assert!(!exp.current);
    }
}
