use crate::model::{InvalidInterval, TimeSlot};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options de détection de conflits.
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    /// Battement minimal entre deux réservations (démontage/remontage).
    pub buffer_minutes: u16,
    /// Temps d'installation requis avant une réservation existante.
    pub setup_minutes: u16,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            buffer_minutes: 30,
            setup_minutes: 45,
        }
    }
}

/// Nature du conflit détecté, de la plus sévère à la moins sévère.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    DirectOverlap,
    BufferViolation,
    SetupConflict,
}

/// Impact du conflit : seuls les conflits mineurs sont auto-résolubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
}

/// Conflit entre le créneau demandé et une réservation existante.
/// Produit à chaque détection, jamais persisté.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub existing: TimeSlot,
    pub requested: TimeSlot,
}

/// Créneau de repli, score décroissant dans [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSlot {
    pub slot: TimeSlot,
    pub score: f64,
}

/// Stratégie appliquée par la résolution automatique, pour l'audit appelant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentTag {
    MovedEarlier,
    MovedLater,
}

/// Issue d'une tentative de résolution automatique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_slot: Option<TimeSlot>,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentTag>,
}

impl ResolutionResult {
    pub(crate) fn failed() -> Self {
        Self {
            success: false,
            new_slot: None,
            adjustments: Vec::new(),
        }
    }

    pub(crate) fn resolved(slot: TimeSlot, tag: AdjustmentTag) -> Self {
        Self {
            success: true,
            new_slot: Some(slot),
            adjustments: vec![tag],
        }
    }

    pub(crate) fn trivially_resolved() -> Self {
        Self {
            success: true,
            new_slot: None,
            adjustments: Vec::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid interval: {0}")]
    InvalidInterval(#[from] InvalidInterval),
    #[error(transparent)]
    Store(#[from] StoreError),
}
