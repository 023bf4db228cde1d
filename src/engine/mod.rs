mod detect;
mod resolve;
mod suggest;
mod types;

pub use detect::detect;
pub use resolve::auto_resolve;
pub use suggest::suggest;
pub use types::{
    AdjustmentTag, AlternativeSlot, Conflict, ConflictKind, DetectOptions, EngineError,
    ResolutionResult, Severity,
};

use crate::clock::{Clock, SystemClock};
use crate::model::{BookingInterval, ServiceKind, TimeSlot, UserPreferences};
use crate::store::BookingStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// Configuration du moteur de disponibilité.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub detect: DetectOptions,
    /// Plage bookable de la journée.
    pub day_bounds: TimeSlot,
    /// Durée de vie d'un instantané en cache.
    pub cache_ttl: Duration,
    /// Nombre maximal d'alternatives proposées.
    pub max_suggestions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detect: DetectOptions::default(),
            day_bounds: TimeSlot::raw(9 * 60, 23 * 60),
            cache_ttl: Duration::minutes(5),
            max_suggestions: 3,
        }
    }
}

/// Réponse de `check_availability`, sérialisable telle quelle vers la route.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub available: bool,
    pub conflicts: Vec<Conflict>,
    pub buffer_violations: Vec<Conflict>,
}

/// Issue de `resolve_conflicts` : soit un créneau résolu, soit des
/// alternatives classées (jamais ni l'un ni l'autre sur une entrée non vide).
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub resolution: ResolutionResult,
    pub alternatives: Vec<AlternativeSlot>,
}

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    intervals: Vec<BookingInterval>,
}

/// Façade du moteur : orchestre détection, suggestion et résolution contre
/// le magasin de réservations, avec cache par date sous TTL.
///
/// Chaque appel est indépendant ; seul le cache est partagé entre requêtes
/// (lectures concurrentes courtes, invalidation atomique). Les erreurs du
/// magasin remontent sans nouvelle tentative : la politique de retry
/// appartient à la route appelante.
pub struct AvailabilityEngine {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    cache: Mutex<HashMap<NaiveDate, CacheEntry>>,
}

impl AvailabilityEngine {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Moteur sur horloge système et configuration par défaut.
    pub fn with_defaults(store: Arc<dyn BookingStore>) -> Self {
        Self::new(store, Arc::new(SystemClock), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Le créneau demandé est-il réservable ce jour-là ?
    ///
    /// Les chevauchements directs sortent dans `conflicts`, les violations de
    /// battement et d'installation dans `buffer_violations`.
    pub fn check_availability(
        &self,
        date: NaiveDate,
        slot: TimeSlot,
        services: &BTreeSet<ServiceKind>,
    ) -> Result<AvailabilityReport, EngineError> {
        let existing = self.day_slots(date)?;
        let detected = detect(slot, &existing, self.config.detect);

        let (conflicts, buffer_violations): (Vec<Conflict>, Vec<Conflict>) = detected
            .into_iter()
            .partition(|c| c.kind == ConflictKind::DirectOverlap);

        let available = conflicts.is_empty() && buffer_violations.is_empty();
        tracing::debug!(
            %date,
            %slot,
            ?services,
            available,
            overlaps = conflicts.len(),
            buffers = buffer_violations.len(),
            "availability checked"
        );

        Ok(AvailabilityReport {
            available,
            conflicts,
            buffer_violations,
        })
    }

    /// Variante frontière : heures `HH:MM` brutes venues de la route,
    /// rejetées avant toute détection si l'intervalle est malformé.
    pub fn check_availability_hhmm(
        &self,
        date: NaiveDate,
        start: &str,
        end: &str,
        services: &BTreeSet<ServiceKind>,
    ) -> Result<AvailabilityReport, EngineError> {
        let slot = TimeSlot::parse(start, end)?;
        self.check_availability(date, slot, services)
    }

    /// Résout un lot de conflits pour une journée donnée.
    ///
    /// Entrée vide : trivialement résolu. Sinon tente l'auto-résolution sur
    /// les conflits mineurs, revérifie le créneau décalé contre l'instantané
    /// complet du jour, et se replie sur le suggesteur en cas d'échec : le
    /// résultat porte toujours soit un créneau résolu, soit des alternatives.
    pub fn resolve_conflicts(
        &self,
        date: NaiveDate,
        conflicts: &[Conflict],
        prefs: UserPreferences,
    ) -> Result<ResolveOutcome, EngineError> {
        if conflicts.is_empty() {
            return Ok(ResolveOutcome {
                resolution: ResolutionResult::trivially_resolved(),
                alternatives: Vec::new(),
            });
        }

        let existing = self.day_slots(date)?;

        for conflict in conflicts {
            let result = auto_resolve(conflict, prefs, self.config.detect);
            let Some(new_slot) = result.new_slot else {
                continue;
            };
            // Le décalage doit être propre contre toute la journée, pas
            // seulement contre le créneau du conflit d'origine.
            if detect(new_slot, &existing, self.config.detect).is_empty() {
                tracing::info!(%date, %new_slot, "conflict auto-resolved");
                return Ok(ResolveOutcome {
                    resolution: result,
                    alternatives: Vec::new(),
                });
            }
        }

        let alternatives = self.clean_alternatives(&conflicts[0], &existing);
        tracing::debug!(
            %date,
            count = alternatives.len(),
            "auto-resolution failed, falling back to suggestions"
        );
        Ok(ResolveOutcome {
            resolution: ResolutionResult::failed(),
            alternatives,
        })
    }

    /// Alternatives classées pour un conflit donné (puces de la vue calendrier).
    pub fn suggest_alternatives(
        &self,
        date: NaiveDate,
        conflict: &Conflict,
    ) -> Result<Vec<AlternativeSlot>, EngineError> {
        let existing = self.day_slots(date)?;
        Ok(self.clean_alternatives(conflict, &existing))
    }

    /// Alternatives garanties sans conflit : trous gonflés du battement, puis
    /// chaque candidat revérifié par la détection complète. Un créneau que la
    /// détection vient de recaler ne doit jamais ressortir comme alternative.
    fn clean_alternatives(&self, conflict: &Conflict, existing: &[TimeSlot]) -> Vec<AlternativeSlot> {
        // Un candidat par trou au plus : ce plafond couvre tous les trous.
        let candidates = existing.len() + self.config.max_suggestions + 1;
        let mut alternatives = suggest(
            conflict,
            &self.padded_slots(existing),
            self.config.day_bounds,
            candidates,
        );
        alternatives.retain(|alt| detect(alt.slot, existing, self.config.detect).is_empty());
        alternatives.truncate(self.config.max_suggestions);
        alternatives
    }

    /// Gonfle chaque créneau occupé du battement requis, pour que les
    /// alternatives issues des trous restants respectent d'office le buffer.
    fn padded_slots(&self, existing: &[TimeSlot]) -> Vec<TimeSlot> {
        let pad = self.config.detect.buffer_minutes;
        existing
            .iter()
            .filter_map(|s| {
                TimeSlot::from_minutes(
                    s.start_minutes().saturating_sub(pad),
                    s.end_minutes().saturating_add(pad).min(23 * 60 + 59),
                )
                .ok()
            })
            .collect()
    }

    /// Invalide l'entrée de cache d'une journée (hook de mutation du magasin).
    pub fn invalidate(&self, date: NaiveDate) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.remove(&date);
    }

    pub fn invalidate_all(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    fn day_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, EngineError> {
        Ok(self.snapshot(date)?.iter().map(|b| b.slot).collect())
    }

    /// Instantané du jour, servi du cache tant que le TTL n'est pas écoulé.
    fn snapshot(&self, date: NaiveDate) -> Result<Vec<BookingInterval>, EngineError> {
        let now = self.clock.now();
        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = cache.get(&date) {
                if now - entry.fetched_at < self.config.cache_ttl {
                    tracing::debug!(%date, "booking snapshot served from cache");
                    return Ok(entry.intervals.clone());
                }
            }
        }

        // Point de suspension : la requête magasin se fait hors verrou.
        let intervals = self.store.intervals_for_date(date)?;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            date,
            CacheEntry {
                fetched_at: now,
                intervals: intervals.clone(),
            },
        );
        Ok(intervals)
    }
}
