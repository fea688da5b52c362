//! Pure trash-state transitions, written once over [`Trashable`].

use chrono::{DateTime, Utc};

use registrar_core::{AccountId, TrashState};
use registrar_records::Trashable;

/// Move an entity to the trash.
///
/// Sets the timestamp and deleter attribution together and forces the active
/// flag off. Returns `false` without touching anything if the entity is
/// already trashed — a second caller never overwrites the original
/// attribution.
pub fn trash<T: Trashable>(entity: &mut T, now: DateTime<Utc>, actor_id: AccountId) -> bool {
    if entity.trash_state().is_trashed() {
        return false;
    }
    entity.set_trash_state(TrashState::trashed(now, actor_id));
    entity.force_inactive();
    true
}

/// Restore an entity from the trash.
///
/// Clears timestamp and attribution but leaves the active flag false:
/// restored records require a separate, explicit reactivation step by an
/// admin before they reappear in active rosters. Returns `false` if the
/// entity was not in the trash.
pub fn restore<T: Trashable>(entity: &mut T) -> bool {
    if !entity.trash_state().is_trashed() {
        return false;
    }
    entity.set_trash_state(TrashState::Active);
    entity.force_inactive();
    true
}
