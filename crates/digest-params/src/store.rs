//! Scoped tuning parameter store with copy-on-write snapshots.
//!
//! Readers clone an `Arc` of the current scope set and resolve against
//! that, so a concurrent administrative write can never tear a
//! half-updated scope. Writers build the next scope set, persist it, and
//! swap the `Arc` in one step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::info;

use digest_types::{TuningOverride, TuningParams, ValidationError};

use crate::error::ParamsError;

/// File name of the persisted scope document under the state directory.
pub const SCOPES_FILE: &str = "tuning-scopes.json";

/// The full scope set: one global default plus sparse per-user overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scopes {
    global: TuningParams,
    #[serde(default)]
    users: HashMap<String, TuningOverride>,
}

/// Tuning parameter store.
///
/// All ranking reads go through [`TuningStore::resolve`] or
/// [`TuningStore::resolve_with_knobs`]; nothing reads a shared default
/// object directly.
pub struct TuningStore {
    scopes: RwLock<Arc<Scopes>>,
    state_path: Option<PathBuf>,
}

impl TuningStore {
    /// Create an in-memory store seeded with the given global scope.
    pub fn new(global: TuningParams) -> Result<Self, ParamsError> {
        global.validate()?;
        Ok(Self {
            scopes: RwLock::new(Arc::new(Scopes {
                global,
                users: HashMap::new(),
            })),
            state_path: None,
        })
    }

    /// Create a persistent store: reload the scope document from
    /// `state_dir` if one exists, otherwise seed with `global`.
    pub fn load_or_init(state_dir: &Path, global: TuningParams) -> Result<Self, ParamsError> {
        let path = state_dir.join(SCOPES_FILE);
        let scopes = if path.exists() {
            let bytes =
                fs::read(&path).map_err(|e| ParamsError::Persistence(e.to_string()))?;
            let scopes: Scopes = serde_json::from_slice(&bytes)
                .map_err(|e| ParamsError::Persistence(e.to_string()))?;
            scopes.global.validate()?;
            for patch in scopes.users.values() {
                patch.validate()?;
            }
            info!(
                path = %path.display(),
                users = scopes.users.len(),
                "loaded tuning scopes"
            );
            scopes
        } else {
            global.validate()?;
            Scopes {
                global,
                users: HashMap::new(),
            }
        };
        Ok(Self {
            scopes: RwLock::new(Arc::new(scopes)),
            state_path: Some(path),
        })
    }

    fn snapshot(&self) -> Arc<Scopes> {
        self.scopes
            .read()
            .expect("tuning scopes lock poisoned")
            .clone()
    }

    /// The current global scope.
    pub fn global(&self) -> TuningParams {
        self.snapshot().global.clone()
    }

    /// The stored override for a user, if any.
    pub fn user_override(&self, user_id: &str) -> Option<TuningOverride> {
        self.snapshot().users.get(user_id).cloned()
    }

    /// Resolve effective params for a user: global defaults with the
    /// user's override applied field-by-field. Never partially null.
    pub fn resolve(&self, user_id: &str) -> TuningParams {
        let scopes = self.snapshot();
        match scopes.users.get(user_id) {
            Some(patch) => scopes.global.merged(patch),
            None => scopes.global.clone(),
        }
    }

    /// Resolve for a user, then apply call-scoped knobs on top. The knobs
    /// are validated like persisted values but never written back.
    pub fn resolve_with_knobs(
        &self,
        user_id: &str,
        knobs: &TuningOverride,
    ) -> Result<TuningParams, ValidationError> {
        knobs.validate()?;
        Ok(self.resolve(user_id).merged(knobs))
    }

    /// Update the global scope field-by-field. Rejects out-of-domain
    /// values naming the field; on rejection nothing changes.
    pub fn set_global(&self, patch: &TuningOverride) -> Result<(), ParamsError> {
        patch.validate()?;
        let mut guard = self.scopes.write().expect("tuning scopes lock poisoned");
        let mut next = (**guard).clone();
        next.global = next.global.merged(patch);
        self.persist(&next)?;
        *guard = Arc::new(next);
        info!("updated global tuning scope");
        Ok(())
    }

    /// Update a user's override field-by-field: set fields in `patch`
    /// replace the stored ones, unset fields keep their stored value.
    pub fn set_user_override(
        &self,
        user_id: &str,
        patch: &TuningOverride,
    ) -> Result<(), ParamsError> {
        patch.validate()?;
        let mut guard = self.scopes.write().expect("tuning scopes lock poisoned");
        let mut next = (**guard).clone();
        let entry = next.users.entry(user_id.to_string()).or_default();
        merge_patch(entry, patch);
        self.persist(&next)?;
        *guard = Arc::new(next);
        info!(user_id = %user_id, "updated user tuning scope");
        Ok(())
    }

    /// Drop a user's override entirely, falling back to global.
    pub fn clear_user_override(&self, user_id: &str) -> Result<(), ParamsError> {
        let mut guard = self.scopes.write().expect("tuning scopes lock poisoned");
        if !guard.users.contains_key(user_id) {
            return Ok(());
        }
        let mut next = (**guard).clone();
        next.users.remove(user_id);
        self.persist(&next)?;
        *guard = Arc::new(next);
        info!(user_id = %user_id, "cleared user tuning scope");
        Ok(())
    }

    /// Persist before the swap, so a failed write leaves the in-memory
    /// state unchanged. In-memory stores skip this.
    fn persist(&self, scopes: &Scopes) -> Result<(), ParamsError> {
        let Some(path) = &self.state_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ParamsError::Persistence(e.to_string()))?;
        }
        let json = serde_json::to_vec_pretty(scopes)
            .map_err(|e| ParamsError::Persistence(e.to_string()))?;
        fs::write(path, json).map_err(|e| ParamsError::Persistence(e.to_string()))?;
        Ok(())
    }
}

fn merge_patch(existing: &mut TuningOverride, patch: &TuningOverride) {
    if let Some(v) = patch.top_k {
        existing.top_k = Some(v);
    }
    if let Some(v) = patch.min_relevance {
        existing.min_relevance = Some(v);
    }
    if let Some(v) = patch.recency_half_life {
        existing.recency_half_life = Some(v);
    }
    if let Some(v) = patch.diversity_lambda {
        existing.diversity_lambda = Some(v);
    }
    if let Some(v) = &patch.topic_quota {
        existing.topic_quota = Some(v.clone());
    }
    if let Some(v) = &patch.user_interest_weight {
        existing.user_interest_weight = Some(v.clone());
    }
}
