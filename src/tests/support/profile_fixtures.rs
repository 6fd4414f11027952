use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::profile::domain::entities::{Education, Experience, Profile, Proficiency, Skill};

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn as_patch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("patch must be an object, got {other}"),
    }
}

/// A `/user/me` payload using the backend's mixed key spellings.
pub fn raw_user_document() -> Value {
    json!({
        "_id": "user-1",
        "fullname": "Grace Hopper",
        "profile": {
            "headline": "Rear Admiral",
            "about": "Compiler pioneer",
            "experiences": [{
                "_id": "exp-1",
                "title": "Programmer",
                "company": "Eckert-Mauchly",
                "employmentType": "Full-time",
                "startDate": "1949-01-01T00:00:00.000Z",
                "endDate": "1950-12-31"
            }],
            "education": [{
                "_id": "edu-1",
                "school": "NYU",
                "degree": "MS",
                "fieldOfStudy": "CS",
                "startDate": "2018-09-01",
                "endDate": "2020-06-01"
            }],
            "skills": ["COBOL", { "name": "Rust", "proficiency": "Expert" }]
        }
    })
}

pub fn nyu_education() -> Education {
    Education {
        id: "edu-1".to_string(),
        school: "NYU".to_string(),
        degree: "MS".to_string(),
        field: Some("CS".to_string()),
        start_date: date(2018, 9, 1),
        end_date: date(2020, 6, 1),
        ..Default::default()
    }
}

pub fn seeded_profile() -> Profile {
    Profile {
        full_name: "Grace Hopper".to_string(),
        headline: "Rear Admiral".to_string(),
        about: "Compiler pioneer".to_string(),
        experience: vec![Experience {
            id: "exp-1".to_string(),
            title: "Programmer".to_string(),
            company: "Eckert-Mauchly".to_string(),
            start_date: date(1949, 1, 1),
            end_date: date(1950, 12, 31),
            ..Default::default()
        }],
        education: vec![nyu_education()],
        skills: vec![
            Skill::named("COBOL"),
            Skill {
                name: "Rust".to_string(),
                proficiency: Proficiency(4),
                description: String::new(),
            },
        ],
        ..Default::default()
    }
}
