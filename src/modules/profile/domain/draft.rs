use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::entities::{
    AboutSection, Certification, Education, Experience, Profile, ProfileHeader, Skill,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Experience,
    Education,
    Skill,
    Certification,
    About,
    ProfileHeader,
}

impl EntityKind {
    /// Repeatable kinds live in a collection and are addressed by index.
    pub fn is_repeatable(&self) -> bool {
        matches!(
            self,
            EntityKind::Experience
                | EntityKind::Education
                | EntityKind::Skill
                | EntityKind::Certification
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Experience => "experience",
            EntityKind::Education => "education",
            EntityKind::Skill => "skill",
            EntityKind::Certification => "certification",
            EntityKind::About => "about",
            EntityKind::ProfileHeader => "profile header",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    New,
    Edit(usize),
}

/// The record currently being edited, tagged by kind so every consumer
/// matches exhaustively instead of switching on a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Experience(Experience),
    Education(Education),
    Skill(Skill),
    Certification(Certification),
    About(AboutSection),
    ProfileHeader(ProfileHeader),
}

impl Draft {
    pub fn kind(&self) -> EntityKind {
        match self {
            Draft::Experience(_) => EntityKind::Experience,
            Draft::Education(_) => EntityKind::Education,
            Draft::Skill(_) => EntityKind::Skill,
            Draft::Certification(_) => EntityKind::Certification,
            Draft::About(_) => EntityKind::About,
            Draft::ProfileHeader(_) => EntityKind::ProfileHeader,
        }
    }

    /// Type-correct empty record for a fresh "add" dialog.
    pub fn defaults(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Experience => Draft::Experience(Experience::default()),
            EntityKind::Education => Draft::Education(Education::default()),
            EntityKind::Skill => Draft::Skill(Skill::default()),
            EntityKind::Certification => Draft::Certification(Certification::default()),
            EntityKind::About => Draft::About(AboutSection::default()),
            EntityKind::ProfileHeader => Draft::ProfileHeader(ProfileHeader::default()),
        }
    }

    /// Existing record for an "edit" dialog. Singular kinds ignore `index`.
    pub fn from_profile(profile: &Profile, kind: EntityKind, index: usize) -> Option<Self> {
        match kind {
            EntityKind::Experience => profile.experience.get(index).cloned().map(Draft::Experience),
            EntityKind::Education => profile.education.get(index).cloned().map(Draft::Education),
            EntityKind::Skill => profile.skills.get(index).cloned().map(Draft::Skill),
            EntityKind::Certification => profile
                .certifications
                .get(index)
                .cloned()
                .map(Draft::Certification),
            EntityKind::About => Some(Draft::About(profile.about_section())),
            EntityKind::ProfileHeader => Some(Draft::ProfileHeader(profile.header())),
        }
    }

    /// Shallow-merges form values into the draft. Keys are the wire names
    /// (`startDate`, `issuingOrganization`, ...). On a type mismatch the draft
    /// is left untouched.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<(), serde_json::Error> {
        *self = match self {
            Draft::Experience(r) => Draft::Experience(patched(r, patch)?),
            Draft::Education(r) => Draft::Education(patched(r, patch)?),
            Draft::Skill(r) => Draft::Skill(patched(r, patch)?),
            Draft::Certification(r) => Draft::Certification(patched(r, patch)?),
            Draft::About(r) => Draft::About(patched(r, patch)?),
            Draft::ProfileHeader(r) => Draft::ProfileHeader(patched(r, patch)?),
        };
        Ok(())
    }
}

fn patched<T>(record: &T, patch: &Map<String, Value>) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(fields) = &mut value {
        for (key, v) in patch {
            fields.insert(key.clone(), v.clone());
        }
    }
    serde_json::from_value(value)
}
