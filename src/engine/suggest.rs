use super::{AlternativeSlot, Conflict};
use crate::model::TimeSlot;
use std::cmp::Ordering;

/// Propose des créneaux libres de même durée que la demande d'origine.
///
/// Score = proximité temporelle avec le départ demandé, dans [0, 1]. Tri
/// décroissant par score, égalité départagée par le départ le plus tôt.
/// Journée pleine : séquence vide, pas une erreur.
pub fn suggest(
    conflict: &Conflict,
    existing: &[TimeSlot],
    day_bounds: TimeSlot,
    max_results: usize,
) -> Vec<AlternativeSlot> {
    let duration = conflict.requested.duration_minutes();
    let total_day = day_bounds.duration_minutes();
    let wanted_start = conflict.requested.start_minutes();

    let mut out = Vec::new();
    for gap in free_intervals(existing, day_bounds) {
        if gap.duration_minutes() < duration {
            continue;
        }
        // Position faisable la plus proche du départ demandé dans ce trou.
        let latest_start = gap.end_minutes() - duration;
        let start = wanted_start.clamp(gap.start_minutes(), latest_start);
        let Ok(slot) = TimeSlot::from_minutes(start, start + duration) else {
            continue;
        };
        let distance = start.abs_diff(wanted_start);
        let score = (1.0 - f64::from(distance) / f64::from(total_day)).clamp(0.0, 1.0);
        out.push(AlternativeSlot { slot, score });
    }

    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.slot.cmp(&b.slot))
    });
    out.truncate(max_results);
    out
}

/// Complément des créneaux occupés à l'intérieur des bornes de la journée.
fn free_intervals(existing: &[TimeSlot], day_bounds: TimeSlot) -> Vec<TimeSlot> {
    let mut busy: Vec<TimeSlot> = existing
        .iter()
        .filter(|s| s.overlaps(&day_bounds))
        .copied()
        .collect();
    busy.sort();

    let mut free = Vec::new();
    let mut cursor = day_bounds.start_minutes();
    for slot in busy {
        let start = slot.start_minutes().max(day_bounds.start_minutes());
        let end = slot.end_minutes().min(day_bounds.end_minutes());
        if start > cursor {
            if let Ok(gap) = TimeSlot::from_minutes(cursor, start) {
                free.push(gap);
            }
        }
        cursor = cursor.max(end);
    }
    if cursor < day_bounds.end_minutes() {
        if let Ok(gap) = TimeSlot::from_minutes(cursor, day_bounds.end_minutes()) {
            free.push(gap);
        }
    }
    free
}
