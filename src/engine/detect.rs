use super::{Conflict, ConflictKind, DetectOptions, Severity};
use crate::model::TimeSlot;

/// Classe le créneau demandé contre chaque réservation existante.
///
/// Au plus un conflit par créneau existant ; `DirectOverlap` prime sur
/// `BufferViolation`, qui prime sur `SetupConflict`. L'ordre de sortie suit
/// l'ordre de `existing`.
pub fn detect(requested: TimeSlot, existing: &[TimeSlot], opts: DetectOptions) -> Vec<Conflict> {
    existing
        .iter()
        .filter_map(|ex| classify(requested, *ex, opts))
        .collect()
}

fn classify(requested: TimeSlot, existing: TimeSlot, opts: DetectOptions) -> Option<Conflict> {
    if requested.overlaps(&existing) {
        // Chevauchement direct : majeur dès que plus de la moitié du créneau
        // demandé est couverte, et de toute façon non auto-résoluble.
        return Some(Conflict {
            kind: ConflictKind::DirectOverlap,
            severity: severity_for(ConflictKind::DirectOverlap, requested, existing),
            existing,
            requested,
        });
    }

    let gap = requested.gap_minutes(&existing);
    if gap < opts.buffer_minutes {
        return Some(Conflict {
            kind: ConflictKind::BufferViolation,
            severity: severity_for(ConflictKind::BufferViolation, requested, existing),
            existing,
            requested,
        });
    }

    // Fin du créneau demandé exactement au début de l'installation requise.
    let requested_before = requested.end_minutes() <= existing.start_minutes();
    if requested_before && gap == opts.setup_minutes {
        return Some(Conflict {
            kind: ConflictKind::SetupConflict,
            severity: severity_for(ConflictKind::SetupConflict, requested, existing),
            existing,
            requested,
        });
    }

    None
}

fn severity_for(kind: ConflictKind, requested: TimeSlot, existing: TimeSlot) -> Severity {
    if kind == ConflictKind::DirectOverlap {
        return Severity::Major;
    }
    // Escalade générique : un recouvrement au-delà de la moitié de la durée
    // demandée rend n'importe quel conflit majeur.
    if u32::from(requested.overlap_minutes(&existing)) * 2
        > u32::from(requested.duration_minutes())
    {
        return Severity::Major;
    }
    Severity::Minor
}
