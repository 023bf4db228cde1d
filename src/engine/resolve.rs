use super::{AdjustmentTag, Conflict, ConflictKind, DetectOptions, ResolutionResult, Severity};
use crate::model::UserPreferences;

/// Tente de résorber un conflit mineur en décalant le créneau demandé.
///
/// Politique déterministe : seules les violations de battement mineures sont
/// auto-résolubles. Le sens du décalage suit la position relative des deux
/// créneaux (demande avant l'existant : plus tôt, sous `allow_early_start` ;
/// demande après : plus tard, sous `allow_late_end`). Les chevauchements
/// directs et les conflits majeurs exigent un choix humain assisté par le
/// suggesteur, jamais un décalage silencieux.
pub fn auto_resolve(
    conflict: &Conflict,
    prefs: UserPreferences,
    opts: DetectOptions,
) -> ResolutionResult {
    if conflict.severity != Severity::Minor || conflict.kind != ConflictKind::BufferViolation {
        return ResolutionResult::failed();
    }

    let gap = conflict.requested.gap_minutes(&conflict.existing);
    let deficit = opts.buffer_minutes.saturating_sub(gap);
    if deficit == 0 {
        return ResolutionResult::failed();
    }

    let requested_before = conflict.requested.end_minutes() <= conflict.existing.start_minutes();
    if requested_before {
        if !prefs.allow_early_start {
            return ResolutionResult::failed();
        }
        match conflict.requested.shifted_earlier(deficit) {
            Ok(slot) => ResolutionResult::resolved(slot, AdjustmentTag::MovedEarlier),
            Err(_) => ResolutionResult::failed(),
        }
    } else {
        if !prefs.allow_late_end {
            return ResolutionResult::failed();
        }
        match conflict.requested.shifted_later(deficit) {
            Ok(slot) => ResolutionResult::resolved(slot, AdjustmentTag::MovedLater),
            Err(_) => ResolutionResult::failed(),
        }
    }
}
