use std::borrow::Cow;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::profile::domain::entities::{
    parse_date_lenient, Certification, Education, EmploymentType, Experience, Profile,
    Proficiency, Skill,
};

//
// ──────────────────────────────────────────────────────────
// Field normalizer
// ──────────────────────────────────────────────────────────
// Backend documents carry the same value at several historical paths:
// - nested:  raw.profile.<field>
// - legacy:  raw.<field>
// - about:   either a bare string or an object holding bio/headline/location/website
//
// Resolution order per field is nested, then nested about object, then
// legacy root, then legacy about object, then an empty default. This module
// is the only place that knows about those paths.
//

type Scope<'a> = Cow<'a, Map<String, Value>>;

struct Scopes<'a> {
    ordered: Vec<Scope<'a>>,
}

impl<'a> Scopes<'a> {
    fn of(raw: &'a Value) -> Self {
        let root = raw.as_object();
        let nested = root.and_then(|r| r.get("profile")).and_then(Value::as_object);

        let mut ordered = Vec::with_capacity(4);
        if let Some(nested) = nested {
            ordered.push(Cow::Borrowed(nested));
            if let Some(about) = nested.get("about").and_then(promote_about) {
                ordered.push(about);
            }
        }
        if let Some(root) = root {
            ordered.push(Cow::Borrowed(root));
            if let Some(about) = root.get("about").and_then(promote_about) {
                ordered.push(about);
            }
        }
        Self { ordered }
    }

    fn find(&self, keys: &[&str], accept: fn(&Value) -> bool) -> Option<&Value> {
        self.ordered.iter().find_map(|scope| {
            keys.iter()
                .filter_map(|key| scope.get(*key))
                .find(|v| accept(v))
        })
    }

    fn text(&self, keys: &[&str]) -> String {
        self.find(keys, is_text).and_then(as_text).unwrap_or_default()
    }

    fn array(&self, keys: &[&str]) -> &[Value] {
        self.find(keys, Value::is_array)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A bare-string `about` becomes `{bio: value}`; objects pass through.
fn promote_about(value: &Value) -> Option<Scope<'_>> {
    match value {
        Value::String(bio) => {
            let mut promoted = Map::new();
            promoted.insert("bio".to_string(), Value::String(bio.clone()));
            Some(Cow::Owned(promoted))
        }
        Value::Object(obj) => Some(Cow::Borrowed(obj)),
        _ => None,
    }
}

fn is_text(value: &Value) -> bool {
    value.is_string() || value.is_number()
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Field access on one raw record, tolerant of aliases and wrong types.
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|v| !v.is_null())
    }

    fn text(&self, keys: &[&str]) -> String {
        self.opt_text(keys).unwrap_or_default()
    }

    fn opt_text(&self, keys: &[&str]) -> Option<String> {
        self.get(keys)
            .and_then(as_text)
            .filter(|s| !s.is_empty())
    }

    fn flag(&self, keys: &[&str]) -> bool {
        match self.get(keys) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        self.get(keys)
            .and_then(Value::as_str)
            .and_then(parse_date_lenient)
    }

    fn strings(&self, keys: &[&str]) -> Vec<String> {
        self.get(keys)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(as_text)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Produces the canonical profile from whatever the backend sent.
///
/// Never fails: missing, null or mistyped input yields type-correct defaults.
pub fn normalize(raw: &Value) -> Profile {
    let scopes = Scopes::of(raw);

    Profile {
        full_name: scopes.text(&["fullName", "fullname", "name"]),
        headline: scopes.text(&["headline"]),
        about: scopes.text(&["bio", "summary"]),
        location: scopes.text(&["location"]),
        website: scopes.text(&["website", "portfolio"]),
        experience: records(scopes.array(&["experience", "experiences"]), experience_from),
        education: records(scopes.array(&["education", "educations"]), education_from),
        skills: scopes.array(&["skills"]).iter().filter_map(skill_from).collect(),
        certifications: records(
            scopes.array(&["certifications", "certificates"]),
            certification_from,
        ),
    }
}

fn records<T>(items: &[Value], build: fn(Fields<'_>) -> T) -> Vec<T> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| build(Fields(obj)))
        .collect()
}

fn experience_from(f: Fields<'_>) -> Experience {
    let current = f.flag(&["current", "isCurrent", "currentlyWorking"]);
    Experience {
        id: f.text(&["id", "_id"]),
        title: f.text(&["title", "position", "role"]),
        company: f.text(&["company", "companyName", "organization"]),
        employment_type: f
            .get(&["employmentType", "type"])
            .and_then(Value::as_str)
            .and_then(EmploymentType::parse)
            .unwrap_or_default(),
        location: f.opt_text(&["location"]),
        start_date: f.date(&["startDate", "from", "start"]),
        end_date: if current {
            None
        } else {
            f.date(&["endDate", "to", "end"])
        },
        current,
        description: f.opt_text(&["description"]),
        skills_used: f.strings(&["skillsUsed", "skills"]),
    }
}

fn education_from(f: Fields<'_>) -> Education {
    let current = f.flag(&["current", "isCurrent"]);
    Education {
        id: f.text(&["id", "_id"]),
        school: f.text(&["school", "institution", "university"]),
        degree: f.text(&["degree"]),
        field: f.opt_text(&["field", "fieldOfStudy", "major"]),
        start_date: f.date(&["startDate", "from", "start"]),
        end_date: if current {
            None
        } else {
            f.date(&["endDate", "to", "end"])
        },
        current,
        grade: f.opt_text(&["grade", "gpa"]),
        activities: f.opt_text(&["activities"]),
        description: f.opt_text(&["description"]),
    }
}

fn certification_from(f: Fields<'_>) -> Certification {
    let does_not_expire = f.flag(&["doesNotExpire", "noExpiry"]);
    Certification {
        id: f.text(&["id", "_id"]),
        name: f.text(&["name", "title"]),
        issuing_organization: f.text(&["issuingOrganization", "issuer", "organization"]),
        issue_date: f.date(&["issueDate", "issuedAt", "date"]),
        does_not_expire,
        expiration_date: if does_not_expire {
            None
        } else {
            f.date(&["expirationDate", "expiryDate", "expiresAt"])
        },
        credential_id: f.opt_text(&["credentialId"]),
        credential_url: f.opt_text(&["credentialUrl", "url"]),
        description: f.opt_text(&["description"]),
    }
}

/// Lifts both skill shapes (bare name or object) into one. Entries that
/// carry no name at all are skipped.
fn skill_from(value: &Value) -> Option<Skill> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(Skill::named(name.trim())),
        Value::Object(obj) => {
            let f = Fields(obj);
            let name = f.opt_text(&["name", "title"])?;
            let proficiency = match f.get(&["proficiency", "level"]) {
                Some(Value::Number(n)) => n.as_i64().map(Proficiency::clamped),
                Some(Value::String(label)) => Proficiency::from_label(label)
                    .or_else(|| label.trim().parse::<i64>().ok().map(Proficiency::clamped)),
                _ => None,
            }
            .unwrap_or_default();

            Some(Skill {
                name,
                proficiency,
                description: f.text(&["description"]),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_documents_yield_all_defaults() {
        assert_eq!(normalize(&Value::Null), Profile::default());
        assert_eq!(normalize(&json!({})), Profile::default());
        assert_eq!(normalize(&json!("not a document")), Profile::default());
        assert_eq!(normalize(&json!([1, 2, 3])), Profile::default());
    }

    #[test]
    fn nested_values_win_over_legacy_root_values() {
        let raw = json!({
            "fullname": "Legacy Name",
            "headline": "Legacy headline",
            "skills": ["Cobol"],
            "profile": {
                "fullName": "Nested Name",
                "headline": "Nested headline",
                "skills": ["Rust"]
            }
        });

        let profile = normalize(&raw);

        assert_eq!(profile.full_name, "Nested Name");
        assert_eq!(profile.headline, "Nested headline");
        assert_eq!(profile.skills, vec![Skill::named("Rust")]);
    }

    #[test]
    fn legacy_root_values_fill_fields_missing_from_nested() {
        let raw = json!({
            "fullname": "Root Name",
            "location": "Berlin",
            "profile": { "headline": "Engineer" }
        });

        let profile = normalize(&raw);

        assert_eq!(profile.full_name, "Root Name");
        assert_eq!(profile.location, "Berlin");
        assert_eq!(profile.headline, "Engineer");
    }

    #[test]
    fn bare_string_about_is_promoted_and_merged_with_other_fields() {
        let raw = json!({
            "website": "https://ada.dev",
            "profile": {
                "about": "I build compilers.",
                "location": "London"
            }
        });

        let profile = normalize(&raw);

        assert_eq!(profile.about, "I build compilers.");
        assert_eq!(profile.location, "London");
        assert_eq!(profile.website, "https://ada.dev");
    }

    #[test]
    fn about_object_supplies_headline_when_no_direct_field() {
        let raw = json!({
            "about": { "bio": "Root bio", "headline": "Root about headline" },
            "profile": { "about": { "bio": "Nested bio" } }
        });

        let profile = normalize(&raw);

        assert_eq!(profile.about, "Nested bio");
        assert_eq!(profile.headline, "Root about headline");
    }

    #[test]
    fn both_skill_shapes_normalize_to_the_same_name() {
        let bare = normalize(&json!({ "skills": ["Go"] }));
        let object = normalize(&json!({ "skills": [{ "name": "Go" }] }));

        assert_eq!(bare.skills[0].name, "Go");
        assert_eq!(object.skills[0].name, "Go");
        assert_eq!(bare.skills[0], object.skills[0]);
        assert_eq!(bare.skills[0].proficiency, Proficiency::ADVANCED);
        assert_eq!(bare.skills[0].description, "");
    }

    #[test]
    fn skill_proficiency_accepts_numbers_and_labels() {
        let profile = normalize(&json!({
            "skills": [
                { "name": "Rust", "proficiency": 5 },
                { "name": "SQL", "proficiency": "Beginner" },
                { "name": "Go", "proficiency": "4" },
                { "proficiency": 2 },
                null,
                ""
            ]
        }));

        let levels: Vec<(String, u8)> = profile
            .skills
            .iter()
            .map(|s| (s.name.clone(), s.proficiency.0))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("Rust".to_string(), 5),
                ("SQL".to_string(), 1),
                ("Go".to_string(), 4)
            ]
        );
    }

    #[test]
    fn malformed_collections_are_ignored_not_fatal() {
        let raw = json!({
            "profile": { "education": "oops" },
            "education": [ 42, { "school": "NYU", "degree": "MS" } ],
            "experience": { "title": "not a list" }
        });

        let profile = normalize(&raw);

        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.education[0].school, "NYU");
        assert!(profile.experience.is_empty());
    }

    #[test]
    fn experience_records_are_read_through_aliases() {
        let profile = normalize(&json!({
            "experiences": [{
                "_id": "e1",
                "position": "Backend Engineer",
                "companyName": "Acme",
                "type": "part time",
                "from": "2020-01-15T00:00:00.000Z",
                "to": "2021-03-01",
                "current": "true",
                "skillsUsed": ["Rust", 7, ""]
            }]
        }));

        let exp = &profile.experience[0];
        assert_eq!(exp.id, "e1");
        assert_eq!(exp.title, "Backend Engineer");
        assert_eq!(exp.company, "Acme");
        assert_eq!(exp.employment_type, EmploymentType::PartTime);
        assert_eq!(exp.start_date, NaiveDate::from_ymd_opt(2020, 1, 15));
        assert!(exp.current);
        assert_eq!(exp.end_date, None, "current positions carry no end date");
        assert_eq!(exp.skills_used, vec!["Rust".to_string(), "7".to_string()]);
    }

    #[test]
    fn certifications_that_never_expire_drop_expiration_date() {
        let profile = normalize(&json!({
            "certificates": [{
                "name": "CKA",
                "issuer": "CNCF",
                "issueDate": "2022-05-01",
                "doesNotExpire": true,
                "expirationDate": "2025-05-01"
            }]
        }));

        let cert = &profile.certifications[0];
        assert_eq!(cert.issuing_organization, "CNCF");
        assert!(cert.does_not_expire);
        assert_eq!(cert.expiration_date, None);
    }
}
