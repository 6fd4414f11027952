use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{watch, Notify};

use crate::profile::application::ports::outgoing::{
    BackendError, ProfileBackend, RawProfileDocument, SectionUpdate,
};
use crate::profile::domain::entities::Profile;

type UpdateReply = Result<Option<RawProfileDocument>, BackendError>;

#[derive(Default)]
struct Recorded {
    document: RawProfileDocument,
    replies: VecDeque<UpdateReply>,
    updates: Vec<SectionUpdate>,
    projection: Option<watch::Receiver<Profile>>,
    seen_mid_flight: Vec<Profile>,
}

/// Hand-rolled backend for scenario tests. Records every section update,
/// answers from a scripted queue (default: `Ok(None)`), and can hold a
/// request open until the test releases it.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Mutex<Recorded>>,
    gate: Option<Arc<Gate>>,
}

#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(document: RawProfileDocument) -> Self {
        let backend = Self::new();
        backend.lock().document = document;
        backend
    }

    /// Holds every update until [`Gate::release`] is called.
    pub fn gated(mut self) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn reply_with(&self, reply: UpdateReply) {
        self.lock().replies.push_back(reply);
    }

    /// Captures the profile the service exposes while each update is in flight.
    pub fn observe(&self, projection: watch::Receiver<Profile>) {
        self.lock().projection = Some(projection);
    }

    pub fn updates(&self) -> Vec<SectionUpdate> {
        self.lock().updates.clone()
    }

    pub fn seen_mid_flight(&self) -> Vec<Profile> {
        self.lock().seen_mid_flight.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl ProfileBackend for RecordingBackend {
    async fn fetch_profile(&self) -> Result<RawProfileDocument, BackendError> {
        Ok(self.lock().document.clone())
    }

    async fn update_section(&self, update: SectionUpdate) -> UpdateReply {
        let reply = {
            let mut recorded = self.lock();
            recorded.updates.push(update);
            if let Some(seen) = recorded.projection.as_ref().map(|rx| rx.borrow().clone()) {
                recorded.seen_mid_flight.push(seen);
            }
            recorded.replies.pop_front().unwrap_or(Ok(None))
        };

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        reply
    }
}
