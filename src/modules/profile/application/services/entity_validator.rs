use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::profile::domain::draft::Draft;
use crate::profile::domain::entities::{
    has_text, AboutSection, Certification, Education, Experience, ProfileHeader, Skill,
};

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("static url pattern compiles")
});

/// One problem with one form field. `field` uses the wire name so the view
/// can attach the message next to the matching input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The dialog only ever shows this one.
    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    fn require(&mut self, present: bool, field: &'static str, message: &str) {
        if !present {
            self.errors.push(FieldError::new(field, message));
        }
    }
}

/// Field-presence and type rules for one record. Pure; never touches state.
pub fn validate(draft: &Draft) -> ValidationReport {
    let mut report = ValidationReport::default();
    match draft {
        Draft::Experience(exp) => experience_rules(exp, &mut report),
        Draft::Education(edu) => education_rules(edu, &mut report),
        Draft::Skill(skill) => skill_rules(skill, &mut report),
        Draft::Certification(cert) => certification_rules(cert, &mut report),
        Draft::About(about) => about_rules(about, &mut report),
        Draft::ProfileHeader(header) => header_rules(header, &mut report),
    }
    report
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn experience_rules(exp: &Experience, report: &mut ValidationReport) {
    report.require(filled(&exp.title), "title", "Title is required");
    report.require(filled(&exp.company), "company", "Company is required");
    report.require(exp.start_date.is_some(), "startDate", "Start date is required");
    report.require(
        exp.current || exp.end_date.is_some(),
        "endDate",
        "End date is required unless this is your current position",
    );
    date_order(exp.start_date, exp.end_date, exp.current, report);
}

fn education_rules(edu: &Education, report: &mut ValidationReport) {
    report.require(filled(&edu.school), "school", "School is required");
    report.require(filled(&edu.degree), "degree", "Degree is required");
    report.require(has_text(&edu.field), "field", "Field of study is required");
    report.require(edu.start_date.is_some(), "startDate", "Start date is required");
    report.require(
        edu.current || edu.end_date.is_some(),
        "endDate",
        "End date is required unless you are currently studying here",
    );
    date_order(edu.start_date, edu.end_date, edu.current, report);
}

fn skill_rules(skill: &Skill, report: &mut ValidationReport) {
    report.require(filled(&skill.name), "name", "Skill name is required");
    report.require(
        skill.proficiency.is_valid(),
        "proficiency",
        "Proficiency must be between 1 and 5",
    );
}

fn certification_rules(cert: &Certification, report: &mut ValidationReport) {
    report.require(filled(&cert.name), "name", "Certification name is required");
    report.require(
        filled(&cert.issuing_organization),
        "issuingOrganization",
        "Issuing organization is required",
    );
    report.require(cert.issue_date.is_some(), "issueDate", "Issue date is required");
    report.require(
        cert.does_not_expire || cert.expiration_date.is_some(),
        "expirationDate",
        "Expiration date is required unless the credential does not expire",
    );
    if !cert.does_not_expire {
        if let (Some(issued), Some(expires)) = (cert.issue_date, cert.expiration_date) {
            report.require(
                expires >= issued,
                "expirationDate",
                "Expiration date cannot be before the issue date",
            );
        }
    }
    if let Some(url) = cert.credential_url.as_deref().filter(|u| filled(u)) {
        report.require(
            HTTP_URL.is_match(url.trim()),
            "credentialUrl",
            "Credential URL must start with http:// or https://",
        );
    }
}

fn about_rules(about: &AboutSection, report: &mut ValidationReport) {
    report.require(filled(&about.about), "about", "About section cannot be empty");
}

fn header_rules(header: &ProfileHeader, report: &mut ValidationReport) {
    report.require(filled(&header.full_name), "fullName", "Full name is required");
    if filled(&header.website) {
        report.require(
            HTTP_URL.is_match(header.website.trim()),
            "website",
            "Website must start with http:// or https://",
        );
    }
}

fn date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    current: bool,
    report: &mut ValidationReport,
) {
    if current {
        return;
    }
    if let (Some(start), Some(end)) = (start, end) {
        report.require(end >= start, "endDate", "End date cannot be before the start date");
    }
}
