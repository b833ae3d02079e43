//! # MongoDB
//!
//! Document store for the class catalogs and events.
//!
//! ## Collections
//!
//! - `gymnastics`: one document, the live signup catalog. The only
//!   collection this service writes to.
//! - `upcoming`: one document, classes not yet open for signup. Read-only.
//! - `events`: one document per event.
//!
//! Both catalog documents are seeded out-of-band. The service never
//! creates or deletes them.
//!
//! ## Atomicity
//!
//! Registration must not cache catalog state or lock in-process, so the
//! one write goes through a single conditional update. The filter matches
//! the target session by exact class name and (day, time) and re-asserts
//! two guards server-side:
//!
//! - no existing signee has the same child name pair
//! - array slot `maxSignups - 1` is unoccupied, i.e. the list is shorter
//!   than the capacity read from the snapshot
//!
//! Concurrent requests for the same session are serialized by the store,
//! and the loser's guard no longer matches. The update then modifies
//! nothing and the caller re-reads to find out why.

use std::time::Duration;

use futures::TryStreamExt;
use mongodb::{
    Client, Database,
    bson::{doc, to_bson},
    options::ClientOptions,
};

use crate::{
    error::AppError,
    models::{Catalog, CatalogKind, Event, Signee},
};

pub const EVENTS_COLLECTION: &str = "events";

pub async fn init_mongo(mongo_url: &str, database: &str) -> Database {
    let mut options = ClientOptions::parse(mongo_url)
        .await
        .expect("Invalid MongoDB connection string!");
    options.server_selection_timeout = Some(Duration::from_secs(5));

    let client = Client::with_options(options).expect("Failed to build MongoDB client!");

    client.database(database)
}

/// Storage port for catalog reads and the one write this service performs.
#[allow(async_fn_in_trait)]
pub trait CatalogStore: Send + Sync {
    async fn catalog(&self, kind: CatalogKind) -> Result<Option<Catalog>, AppError>;

    /// All events, soonest first.
    async fn events(&self) -> Result<Vec<Event>, AppError>;

    /// Appends `signee` to the (day, time) session of `class_name` in one
    /// conditional update, only where the session still has no matching
    /// child name and still holds fewer than `max_signups` signees.
    /// Returns whether the update applied.
    async fn append_signee_if_room_and_unique(
        &self,
        class_name: &str,
        day: &str,
        time: &str,
        max_signups: u32,
        signee: &Signee,
    ) -> Result<bool, AppError>;
}

pub struct MongoCatalogStore {
    db: Database,
}

impl MongoCatalogStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl CatalogStore for MongoCatalogStore {
    async fn catalog(&self, kind: CatalogKind) -> Result<Option<Catalog>, AppError> {
        self.db
            .collection::<Catalog>(kind.collection())
            .find_one(doc! {})
            .await
            .map_err(AppError::internal)
    }

    async fn events(&self) -> Result<Vec<Event>, AppError> {
        self.db
            .collection::<Event>(EVENTS_COLLECTION)
            .find(doc! {})
            .sort(doc! { "date": 1 })
            .await
            .map_err(AppError::internal)?
            .try_collect()
            .await
            .map_err(AppError::internal)
    }

    async fn append_signee_if_room_and_unique(
        &self,
        class_name: &str,
        day: &str,
        time: &str,
        max_signups: u32,
        signee: &Signee,
    ) -> Result<bool, AppError> {
        let mut session_guard = doc! {
            "day": day,
            "time": time,
            "signees": { "$not": { "$elemMatch": {
                "childFirstName": &signee.child_first_name,
                "childLastName": &signee.child_last_name,
            } } },
        };
        // the list is shorter than the capacity iff the last permitted
        // slot is unoccupied
        session_guard.insert(
            format!("signees.{}", max_signups.saturating_sub(1)),
            doc! { "$exists": false },
        );

        let filter = doc! {
            "classes": { "$elemMatch": {
                "name": class_name,
                "sessions": { "$elemMatch": session_guard },
            } },
        };
        let update = doc! {
            "$push": {
                "classes.$[cls].sessions.$[sess].signees":
                    to_bson(signee).map_err(AppError::internal)?,
            },
        };

        let result = self
            .db
            .collection::<Catalog>(CatalogKind::Signups.collection())
            .update_one(filter, update)
            .array_filters([
                doc! { "cls.name": class_name },
                doc! { "sess.day": day, "sess.time": time },
            ])
            .await
            .map_err(AppError::internal)?;

        Ok(result.modified_count == 1)
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::CatalogStore;
    use crate::{
        error::AppError,
        models::{Catalog, CatalogKind, Event, Signee},
    };

    /// In-memory implementation of the catalog port, backing engine and
    /// router tests without a running MongoDB. The guarded append holds
    /// the lock for the whole check-and-push, matching the store-side
    /// atomicity of the real adapter.
    pub struct InMemoryCatalog {
        signups: Mutex<Option<Catalog>>,
        upcoming: Mutex<Option<Catalog>>,
        events: Mutex<Vec<Event>>,
    }

    impl InMemoryCatalog {
        pub fn new(signups: Option<Catalog>, upcoming: Option<Catalog>) -> Self {
            Self {
                signups: Mutex::new(signups),
                upcoming: Mutex::new(upcoming),
                events: Mutex::new(Vec::new()),
            }
        }

        pub fn with_events(self, events: Vec<Event>) -> Self {
            *self.events.lock().unwrap() = events;
            self
        }

        pub fn signee_count(&self, class_name: &str, day: &str, time: &str) -> usize {
            self.signups
                .lock()
                .unwrap()
                .as_ref()
                .and_then(|catalog| {
                    let class = catalog.classes.iter().find(|c| c.name == class_name)?;
                    let session = class
                        .sessions
                        .iter()
                        .find(|s| s.day == day && s.time == time)?;

                    Some(session.signees.len())
                })
                .unwrap_or(0)
        }
    }

    impl CatalogStore for InMemoryCatalog {
        async fn catalog(&self, kind: CatalogKind) -> Result<Option<Catalog>, AppError> {
            let slot = match kind {
                CatalogKind::Signups => &self.signups,
                CatalogKind::Upcoming => &self.upcoming,
            };

            Ok(slot.lock().unwrap().clone())
        }

        async fn events(&self) -> Result<Vec<Event>, AppError> {
            let mut events = self.events.lock().unwrap().clone();
            events.sort_by_key(|event| event.date);

            Ok(events)
        }

        async fn append_signee_if_room_and_unique(
            &self,
            class_name: &str,
            day: &str,
            time: &str,
            max_signups: u32,
            signee: &Signee,
        ) -> Result<bool, AppError> {
            let mut catalog = self.signups.lock().unwrap();

            let Some(catalog) = catalog.as_mut() else {
                return Ok(false);
            };
            let Some(class) = catalog.classes.iter_mut().find(|c| c.name == class_name) else {
                return Ok(false);
            };
            let Some(session) = class
                .sessions
                .iter_mut()
                .find(|s| s.day == day && s.time == time)
            else {
                return Ok(false);
            };

            let duplicate = session.signees.iter().any(|existing| {
                existing.child_first_name == signee.child_first_name
                    && existing.child_last_name == signee.child_last_name
            });
            if duplicate || session.signees.len() >= max_signups as usize {
                return Ok(false);
            }

            session.signees.push(signee.clone());

            Ok(true)
        }
    }
}
