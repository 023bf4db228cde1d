use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Dernière minute représentable dans une journée (23:59).
const LAST_MINUTE: u16 = 23 * 60 + 59;

/// Erreur de construction ou de décalage d'un créneau.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInterval {
    #[error("invalid time of day: {0}")]
    InvalidTime(String),
    #[error("end must be strictly after start")]
    EmptyRange,
    #[error("slot would leave the day")]
    OutsideDay,
}

/// Créneau horaire dans une journée, en minutes entières depuis minuit.
///
/// Immuable après construction ; toutes les comparaisons sont de
/// l'arithmétique entière (exacte et déterministe). Intervalle semi-ouvert
/// `[start, end)` pour les chevauchements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SlotRepr", into = "SlotRepr")]
pub struct TimeSlot {
    start: u16,
    end: u16,
}

impl TimeSlot {
    /// Construit un créneau depuis deux heures `HH:MM` (24h).
    pub fn parse(start: &str, end: &str) -> Result<Self, InvalidInterval> {
        Self::from_minutes(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    /// Construit un créneau depuis des minutes depuis minuit.
    pub fn from_minutes(start: u16, end: u16) -> Result<Self, InvalidInterval> {
        if end > LAST_MINUTE {
            return Err(InvalidInterval::OutsideDay);
        }
        if end <= start {
            return Err(InvalidInterval::EmptyRange);
        }
        Ok(Self { start, end })
    }

    // Constructeur interne pour les bornes par défaut, invariants supposés.
    pub(crate) const fn raw(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn start_minutes(&self) -> u16 {
        self.start
    }
    pub fn end_minutes(&self) -> u16 {
        self.end
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> u16 {
        self.end - self.start
    }

    /// Chevauchement semi-ouvert : `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes communes aux deux créneaux (0 si disjoints).
    pub fn overlap_minutes(&self, other: &TimeSlot) -> u16 {
        if !self.overlaps(other) {
            return 0;
        }
        self.end.min(other.end) - self.start.max(other.start)
    }

    /// Minutes séparant deux créneaux disjoints (0 si adjacents ou chevauchants).
    pub fn gap_minutes(&self, other: &TimeSlot) -> u16 {
        if self.end <= other.start {
            other.start - self.end
        } else if other.end <= self.start {
            self.start - other.end
        } else {
            0
        }
    }

    /// Décale le créneau plus tôt, échoue s'il sortirait de la journée.
    pub fn shifted_earlier(&self, minutes: u16) -> Result<Self, InvalidInterval> {
        let start = self
            .start
            .checked_sub(minutes)
            .ok_or(InvalidInterval::OutsideDay)?;
        Ok(Self {
            start,
            end: self.end - minutes,
        })
    }

    /// Décale le créneau plus tard, échoue s'il sortirait de la journée.
    pub fn shifted_later(&self, minutes: u16) -> Result<Self, InvalidInterval> {
        let end = self.end.saturating_add(minutes);
        if end > LAST_MINUTE {
            return Err(InvalidInterval::OutsideDay);
        }
        Ok(Self {
            start: self.start + minutes,
            end,
        })
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", fmt_hhmm(self.start), fmt_hhmm(self.end))
    }
}

/// Représentation sérialisée `{"start":"HH:MM","end":"HH:MM"}`.
#[derive(Serialize, Deserialize)]
struct SlotRepr {
    start: String,
    end: String,
}

impl From<TimeSlot> for SlotRepr {
    fn from(slot: TimeSlot) -> Self {
        Self {
            start: fmt_hhmm(slot.start),
            end: fmt_hhmm(slot.end),
        }
    }
}

impl TryFrom<SlotRepr> for TimeSlot {
    type Error = InvalidInterval;

    fn try_from(repr: SlotRepr) -> Result<Self, Self::Error> {
        TimeSlot::parse(&repr.start, &repr.end)
    }
}

fn parse_hhmm(raw: &str) -> Result<u16, InvalidInterval> {
    let t = NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| InvalidInterval::InvalidTime(raw.to_string()))?;
    Ok((t.hour() * 60 + t.minute()) as u16)
}

fn fmt_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Identifiant fort pour une réservation confirmée.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookingId(String);

impl BookingId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Prestation couverte par une réservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Dj,
    Photography,
    Karaoke,
}

/// Réservation confirmée telle que vue par le moteur (lecture seule).
///
/// La mutation passe par la couche CRUD du magasin, jamais par le moteur.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingInterval {
    pub slot: TimeSlot,
    pub booking_id: BookingId,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub services: BTreeSet<ServiceKind>,
}

impl BookingInterval {
    pub fn new(slot: TimeSlot, services: BTreeSet<ServiceKind>) -> Self {
        Self {
            slot,
            booking_id: BookingId::random(),
            services,
        }
    }
}

/// Préférences du demandeur, fournies à chaque appel, jamais stockées.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub allow_early_start: bool,
    #[serde(default)]
    pub allow_late_end: bool,
    #[serde(default)]
    pub prefer_morning: bool,
}
