use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::profile::application::ports::incoming::use_cases::{
    ApplyProfileEditUseCase, LoadProfileUseCase, SyncError,
};
use crate::profile::application::ports::outgoing::{
    BackendError, ProfileBackend, ProfileSection, SectionUpdate,
};
use crate::profile::application::services::dedup_merger::{dedup_education, dedup_skills, settle};
use crate::profile::application::services::field_normalizer::normalize;
use crate::profile::domain::draft::{Draft, EditMode, EntityKind};
use crate::profile::domain::entities::{Certification, Education, Experience, Profile};

//
// ──────────────────────────────────────────────────────────
// Service
// ──────────────────────────────────────────────────────────
// Owns the one authoritative in-memory profile. Every write goes through
// `apply`/`delete`/`refresh`:
//   snapshot -> optimistic local write -> one backend request
//   -> reconcile with the server copy, or restore the snapshot.
//

pub struct ProfileSyncService<B>
where
    B: ProfileBackend,
{
    backend: B,
    state: watch::Sender<Profile>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the request ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SyncError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| SyncError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Holds the pre-write snapshot and puts it back when dropped, unless the
/// backend confirmed the write. A caller abandoning the future mid-request
/// rolls back the same way a failed request does.
struct Rollback<'a> {
    state: &'a watch::Sender<Profile>,
    snapshot: Option<Profile>,
}

impl<'a> Rollback<'a> {
    fn arm(state: &'a watch::Sender<Profile>, snapshot: Profile) -> Self {
        Self {
            state,
            snapshot: Some(snapshot),
        }
    }

    fn disarm(mut self) {
        self.snapshot = None;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.state.send_replace(snapshot);
            debug!("Optimistic profile update rolled back");
        }
    }
}

enum ProfileChange {
    Upsert(EditMode, Draft),
    Remove(EntityKind, usize),
}

impl ProfileChange {
    fn kind(&self) -> EntityKind {
        match self {
            ProfileChange::Upsert(_, draft) => draft.kind(),
            ProfileChange::Remove(kind, _) => *kind,
        }
    }
}

impl<B> ProfileSyncService<B>
where
    B: ProfileBackend,
{
    pub fn new(backend: B, initial: Profile) -> Self {
        Self {
            backend,
            state: watch::Sender::new(initial),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetches `/user/me` once and starts the session from its normalized form.
    pub async fn load(backend: B) -> Result<Self, SyncError> {
        let raw = backend.fetch_profile().await.map_err(SyncError::Fetch)?;
        let profile = canonical(&raw);
        info!(
            experience = profile.experience.len(),
            education = profile.education.len(),
            skills = profile.skills.len(),
            "Profile loaded"
        );
        Ok(Self::new(backend, profile))
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    async fn commit(&self, change: ProfileChange) -> Result<Profile, SyncError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let kind = change.kind();
        let section = ProfileSection::for_kind(kind);
        let snapshot = self.state.borrow().clone();

        let optimistic = apply_change(&snapshot, change)?;
        let update = section_update(&optimistic, section)?;

        // Declared after `_guard`, so the snapshot is back before the flag clears.
        let rollback = Rollback::arm(&self.state, snapshot);
        self.state.send_replace(optimistic.clone());
        debug!(?section, "Optimistic profile update applied, persisting");

        match self.backend.update_section(update).await {
            Ok(server_copy) => {
                rollback.disarm();
                let server = server_copy.as_ref().map(canonical);
                let reconciled = reconcile(optimistic, server, section);
                self.state.send_replace(reconciled.clone());
                info!(?section, %kind, "Profile section saved");
                Ok(reconciled)
            }
            Err(cause) => {
                drop(rollback);
                if matches!(cause, BackendError::Unauthorized) {
                    warn!(?section, "Session expired while saving profile; rolled back");
                } else {
                    warn!(?section, error = %cause, "Saving profile failed; rolled back");
                }
                Err(SyncError::Persistence { cause })
            }
        }
    }
}

#[async_trait]
impl<B> ApplyProfileEditUseCase for ProfileSyncService<B>
where
    B: ProfileBackend + Send + Sync,
{
    async fn apply(&self, mode: EditMode, draft: Draft) -> Result<Profile, SyncError> {
        self.commit(ProfileChange::Upsert(mode, draft)).await
    }

    async fn delete(&self, kind: EntityKind, index: usize) -> Result<Profile, SyncError> {
        if !kind.is_repeatable() {
            return Err(SyncError::NotRemovable(kind));
        }
        self.commit(ProfileChange::Remove(kind, index)).await
    }
}

#[async_trait]
impl<B> LoadProfileUseCase for ProfileSyncService<B>
where
    B: ProfileBackend + Send + Sync,
{
    fn current(&self) -> Profile {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Profile> {
        self.state.subscribe()
    }

    async fn refresh(&self) -> Result<Profile, SyncError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let raw = self.backend.fetch_profile().await.map_err(|e| {
            warn!(error = %e, "Refreshing profile failed");
            SyncError::Fetch(e)
        })?;
        let profile = canonical(&raw);
        self.state.send_replace(profile.clone());
        info!("Profile refreshed from backend");
        Ok(profile)
    }
}

//
// ──────────────────────────────────────────────────────────
// Pure steps
// ──────────────────────────────────────────────────────────
//

/// Normalized profile with its repeatable collections already deduplicated,
/// so views never see historical duplicates or out-of-order education.
fn canonical(raw: &Value) -> Profile {
    let mut profile = normalize(raw);
    profile.education = dedup_education(std::mem::take(&mut profile.education));
    profile.skills = dedup_skills(std::mem::take(&mut profile.skills));
    profile
}

trait Identified {
    fn id_mut(&mut self) -> &mut String;
}

impl Identified for Experience {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl Identified for Education {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl Identified for Certification {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

fn upsert<T>(items: &mut Vec<T>, kind: EntityKind, mode: EditMode, record: T) -> Result<(), SyncError> {
    match mode {
        EditMode::New => {
            items.push(record);
            Ok(())
        }
        EditMode::Edit(index) => match items.get_mut(index) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(SyncError::IndexOutOfRange { kind, index }),
        },
    }
}

/// New records get a fresh id; edits keep the stored id when the draft lost it.
fn with_id<T: Identified>(items: &[T], mode: EditMode, mut record: T) -> T
where
    T: Clone,
{
    match mode {
        EditMode::New => *record.id_mut() = Uuid::new_v4().to_string(),
        EditMode::Edit(index) => {
            if record.id_mut().is_empty() {
                if let Some(mut existing) = items.get(index).cloned() {
                    *record.id_mut() = std::mem::take(existing.id_mut());
                }
            }
        }
    }
    record
}

fn remove<T>(items: &mut Vec<T>, kind: EntityKind, index: usize) -> Result<(), SyncError> {
    if index >= items.len() {
        return Err(SyncError::IndexOutOfRange { kind, index });
    }
    items.remove(index);
    Ok(())
}

fn apply_change(current: &Profile, change: ProfileChange) -> Result<Profile, SyncError> {
    let mut next = current.clone();

    match change {
        ProfileChange::Upsert(mode, draft) => match settle(draft) {
            Draft::Experience(exp) => {
                let exp = with_id(&next.experience, mode, exp);
                upsert(&mut next.experience, EntityKind::Experience, mode, exp)?;
            }
            Draft::Education(edu) => {
                let edu = with_id(&next.education, mode, edu);
                upsert(&mut next.education, EntityKind::Education, mode, edu)?;
                next.education = dedup_education(std::mem::take(&mut next.education));
            }
            Draft::Certification(cert) => {
                let cert = with_id(&next.certifications, mode, cert);
                upsert(&mut next.certifications, EntityKind::Certification, mode, cert)?;
            }
            Draft::Skill(skill) => {
                upsert(&mut next.skills, EntityKind::Skill, mode, skill)?;
                next.skills = dedup_skills(std::mem::take(&mut next.skills));
            }
            Draft::About(about) => next.about = about.about.trim().to_string(),
            Draft::ProfileHeader(header) => next.set_header(header),
        },
        ProfileChange::Remove(kind, index) => match kind {
            EntityKind::Experience => remove(&mut next.experience, kind, index)?,
            EntityKind::Education => {
                remove(&mut next.education, kind, index)?;
                next.education = dedup_education(std::mem::take(&mut next.education));
            }
            EntityKind::Skill => remove(&mut next.skills, kind, index)?,
            EntityKind::Certification => remove(&mut next.certifications, kind, index)?,
            EntityKind::About | EntityKind::ProfileHeader => {
                return Err(SyncError::NotRemovable(kind))
            }
        },
    }
    Ok(next)
}

/// Builds the whole-section request body. Skills go over the wire as bare
/// names; the richer shape stays in memory.
fn section_update(profile: &Profile, section: ProfileSection) -> Result<SectionUpdate, SyncError> {
    let encode = |value: Result<Value, serde_json::Error>| {
        value.map_err(|e| SyncError::Encoding(section, e.to_string()))
    };

    let mut body = Map::new();
    match section {
        ProfileSection::Header => {
            body.insert("fullname".into(), Value::String(profile.full_name.clone()));
            body.insert("headline".into(), Value::String(profile.headline.clone()));
            body.insert("location".into(), Value::String(profile.location.clone()));
            body.insert("website".into(), Value::String(profile.website.clone()));
        }
        ProfileSection::About => {
            body.insert("about".into(), Value::String(profile.about.clone()));
        }
        ProfileSection::Skills => {
            let names = profile
                .skills
                .iter()
                .map(|s| Value::String(s.name.clone()))
                .collect();
            body.insert("skills".into(), Value::Array(names));
        }
        ProfileSection::Education => {
            body.insert("education".into(), encode(serde_json::to_value(&profile.education))?);
        }
        ProfileSection::Experience => {
            body.insert("experience".into(), encode(serde_json::to_value(&profile.experience))?);
        }
        ProfileSection::Certifications => {
            body.insert(
                "certifications".into(),
                encode(serde_json::to_value(&profile.certifications))?,
            );
        }
    }
    Ok(SectionUpdate { section, body })
}

fn take_text(local: &mut String, server: String) {
    if !server.is_empty() {
        *local = server;
    }
}

/// Folds the server's copy of the saved section into the optimistic profile.
/// Collections are taken from the server only when it echoed the same number
/// of records (so server-assigned ids land on the right rows). Skills always
/// keep the in-memory shape since the server only stores names.
fn reconcile(optimistic: Profile, server: Option<Profile>, section: ProfileSection) -> Profile {
    let Some(server) = server else {
        return optimistic;
    };

    let mut merged = optimistic;
    match section {
        ProfileSection::Header => {
            take_text(&mut merged.full_name, server.full_name);
            take_text(&mut merged.headline, server.headline);
            take_text(&mut merged.location, server.location);
            take_text(&mut merged.website, server.website);
        }
        ProfileSection::About => take_text(&mut merged.about, server.about),
        ProfileSection::Skills => {}
        ProfileSection::Education => {
            if server.education.len() == merged.education.len() {
                merged.education = server.education;
            }
        }
        ProfileSection::Experience => {
            if server.experience.len() == merged.experience.len() {
                merged.experience = server.experience;
            }
        }
        ProfileSection::Certifications => {
            if server.certifications.len() == merged.certifications.len() {
                merged.certifications = server.certifications;
            }
        }
    }
    merged
}

//
// ──────────────────────────────────────────────────────────
// Unit tests (service only)
// ──────────────────────────────────────────────────────────
//
