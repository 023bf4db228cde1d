use crate::model::{BookingId, BookingInterval};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Erreur remontée par un magasin de réservations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("booking store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Hook appelé après chaque mutation, avec la date touchée.
pub type MutationHook = Box<dyn Fn(NaiveDate) + Send + Sync>;

/// Magasin de réservations : source de vérité externe, lu en instantanés.
///
/// Le moteur ne mute jamais les réservations ; la création/suppression passe
/// par la couche CRUD de l'appelant, qui invalide le cache via le hook de
/// mutation.
pub trait BookingStore: Send + Sync {
    /// Instantané des réservations d'une journée.
    fn intervals_for_date(&self, date: NaiveDate) -> Result<Vec<BookingInterval>, StoreError>;

    /// Abonne un hook de mutation (invalidation du cache moteur).
    /// Par défaut : ignoré, pour les magasins sans flux de mutation.
    fn on_mutation(&self, hook: MutationHook) {
        let _ = hook;
    }
}

/// Magasin en mémoire, avec hooks de mutation pour l'invalidation du cache.
#[derive(Default)]
pub struct MemoryStore {
    days: Mutex<BTreeMap<NaiveDate, Vec<BookingInterval>>>,
    hooks: Mutex<Vec<MutationHook>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre une réservation confirmée.
    pub fn insert(&self, date: NaiveDate, interval: BookingInterval) {
        {
            let mut days = self.days.lock().unwrap_or_else(|e| e.into_inner());
            days.entry(date).or_default().push(interval);
        }
        self.fire(date);
    }

    /// Annule une réservation ; renvoie `false` si elle est inconnue.
    pub fn remove(&self, date: NaiveDate, booking_id: &BookingId) -> bool {
        let removed = {
            let mut days = self.days.lock().unwrap_or_else(|e| e.into_inner());
            match days.get_mut(&date) {
                Some(intervals) => {
                    let before = intervals.len();
                    intervals.retain(|b| &b.booking_id != booking_id);
                    intervals.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.fire(date);
        }
        removed
    }

    fn fire(&self, date: NaiveDate) {
        let hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        for hook in hooks.iter() {
            hook(date);
        }
    }
}

impl BookingStore for MemoryStore {
    fn intervals_for_date(&self, date: NaiveDate) -> Result<Vec<BookingInterval>, StoreError> {
        let days = self.days.lock().unwrap_or_else(|e| e.into_inner());
        Ok(days.get(&date).cloned().unwrap_or_default())
    }

    fn on_mutation(&self, hook: MutationHook) {
        self.hooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(hook);
    }
}

/// Registre complet persisté par [`JsonStore`], clés `YYYY-MM-DD`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub days: BTreeMap<String, Vec<BookingInterval>>,
}

/// Magasin fichier JSON (écriture atomique via fichier temporaire).
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Charge le registre ; un fichier absent vaut registre vide.
    pub fn load(&self) -> anyhow::Result<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let ledger: Ledger =
            serde_json::from_slice(&data).with_context(|| "parsing bookings json")?;
        Ok(ledger)
    }

    /// Sauvegarde de manière atomique.
    pub fn save(&self, ledger: &Ledger) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(ledger)?;
        let mut tmp = NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
            .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

impl BookingStore for JsonStore {
    fn intervals_for_date(&self, date: NaiveDate) -> Result<Vec<BookingInterval>, StoreError> {
        let ledger = self.load()?;
        let key = date.format("%Y-%m-%d").to_string();
        Ok(ledger.days.get(&key).cloned().unwrap_or_default())
    }
}
