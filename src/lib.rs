#![forbid(unsafe_code)]
//! Creneau — moteur de disponibilité et de résolution de conflits pour
//! réservations d'événements (DJ, photo, karaoké).
//!
//! - Créneaux intra-journée en minutes entières (exact, déterministe).
//! - Détection chevauchement / battement / installation.
//! - Suggestion d'alternatives classées, auto-résolution des conflits mineurs.
//! - Façade avec cache par date (TTL), magasin de réservations en trait.
//! - Notifieur par poll pour les vues calendrier.
//!
//! La lib est consommée en in-process par la couche route ; elle ne possède
//! ni protocole réseau, ni CLI.

pub mod clock;
pub mod engine;
pub mod model;
pub mod notify;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    auto_resolve, detect, suggest, AdjustmentTag, AlternativeSlot, AvailabilityEngine,
    AvailabilityReport, Conflict, ConflictKind, DetectOptions, EngineConfig, EngineError,
    ResolutionResult, ResolveOutcome, Severity,
};
pub use model::{
    BookingId, BookingInterval, InvalidInterval, ServiceKind, TimeSlot, UserPreferences,
};
pub use notify::{ChangeSummary, Notifier, Subscription};
pub use store::{BookingStore, JsonStore, Ledger, MemoryStore, MutationHook, StoreError};
