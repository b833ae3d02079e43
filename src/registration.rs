//! Signup registration.
//!
//! The engine checks a request against a snapshot of the live catalog so
//! failures can name their cause, then hands the write to the store's
//! guarded conditional append. The snapshot checks alone would race: two
//! requests can both see a free slot and both push. The append closes
//! that by re-asserting the duplicate and capacity guards inside the one
//! atomic update, so a stale snapshot makes the update match nothing
//! instead of overfilling the session. When that happens the engine
//! re-reads and re-classifies.

use tracing::warn;

use crate::{
    database::CatalogStore,
    error::AppError,
    models::{CatalogKind, Signee},
};

/// A validated, entity-decoded signup request.
#[derive(Clone, Debug)]
pub struct Registration {
    pub class_name: String,
    pub day: String,
    pub time: String,
    pub signee: Signee,
}

const MAX_ATTEMPTS: usize = 3;

pub async fn register<S: CatalogStore>(
    store: &S,
    registration: &Registration,
) -> Result<(), AppError> {
    let signee = registration.signee.normalized();

    for _ in 0..MAX_ATTEMPTS {
        let catalog = store
            .catalog(CatalogKind::Signups)
            .await?
            .ok_or(AppError::NoClassData)?;

        let class = catalog
            .classes
            .iter()
            .find(|class| class.name == registration.class_name)
            .ok_or(AppError::ClassNotFound)?;

        let session = class
            .sessions
            .iter()
            .find(|session| session.day == registration.day && session.time == registration.time)
            .ok_or(AppError::SessionNotFound)?;

        let duplicate = session.signees.iter().any(|existing| {
            existing.child_first_name.to_lowercase() == signee.child_first_name
                && existing.child_last_name.to_lowercase() == signee.child_last_name
        });
        if duplicate {
            return Err(AppError::AlreadySignedUp);
        }

        if session.signees.len() as u32 >= session.max_signups {
            return Err(AppError::SessionFull);
        }

        let applied = store
            .append_signee_if_room_and_unique(
                &registration.class_name,
                &registration.day,
                &registration.time,
                session.max_signups,
                &signee,
            )
            .await?;

        if applied {
            return Ok(());
        }

        // The guard rejected the write: the session changed between our
        // snapshot and the update. Re-read and re-classify.
        warn!(
            class = %registration.class_name,
            day = %registration.day,
            time = %registration.time,
            "conditional append lost a race, retrying"
        );
    }

    Err(AppError::internal("conditional append kept losing races"))
}
