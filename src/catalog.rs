use serde::Serialize;

use crate::{
    database::CatalogStore,
    error::AppError,
    models::{CatalogKind, CatalogView, EventView},
};

/// Both singleton catalogs with every signee list collapsed to a count.
#[derive(Debug, Serialize)]
pub struct ClassCatalogs {
    pub signups: CatalogView,
    pub upcoming: CatalogView,
}

pub async fn class_catalogs<S: CatalogStore>(store: &S) -> Result<ClassCatalogs, AppError> {
    let signups = store
        .catalog(CatalogKind::Signups)
        .await?
        .ok_or(AppError::CatalogMissing)?;
    let upcoming = store
        .catalog(CatalogKind::Upcoming)
        .await?
        .ok_or(AppError::CatalogMissing)?;

    Ok(ClassCatalogs {
        signups: signups.into(),
        upcoming: upcoming.into(),
    })
}

pub async fn upcoming_events<S: CatalogStore>(store: &S) -> Result<Vec<EventView>, AppError> {
    let events = store.events().await?;

    Ok(events.into_iter().map(EventView::from).collect())
}

#[cfg(test)]
mod tests {
    use mongodb::bson::DateTime;

    use super::{class_catalogs, upcoming_events};
    use crate::{
        database::testing::InMemoryCatalog,
        error::AppError,
        models::{Catalog, Class, Event, Session, Signee},
    };

    fn seeded_catalog(season: &str) -> Catalog {
        Catalog {
            id: None,
            season: season.to_string(),
            classes: vec![Class {
                id: 1,
                name: "Tumbling".to_string(),
                sessions: vec![Session {
                    day: "Mon".to_string(),
                    time: "4:00pm".to_string(),
                    max_signups: 8,
                    price: 50.0,
                    signees: vec![Signee {
                        child_first_name: "ana".to_string(),
                        child_last_name: "lee".to_string(),
                        parent_first_name: "Maria".to_string(),
                        parent_last_name: "Lee".to_string(),
                        parent_phone_number: "5551234567".to_string(),
                    }],
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_collapses_signees_to_counts() {
        let store = InMemoryCatalog::new(
            Some(seeded_catalog("Fall")),
            Some(seeded_catalog("Winter")),
        );

        let catalogs = class_catalogs(&store).await.unwrap();
        let body = serde_json::to_value(&catalogs).unwrap();

        let session = &body["signups"]["classes"][0]["sessions"][0];
        assert_eq!(session["signees"], 1);
        assert_eq!(body["upcoming"]["season"], "Winter");

        // the aggregate view must never carry signee records
        assert!(!body.to_string().contains("lee"));
    }

    #[tokio::test]
    async fn test_missing_singleton_is_reported() {
        let store = InMemoryCatalog::new(Some(seeded_catalog("Fall")), None);

        let result = class_catalogs(&store).await;

        assert!(matches!(result, Err(AppError::CatalogMissing)));
    }

    #[tokio::test]
    async fn test_events_sorted_by_date() {
        let event = |name: &str, millis: i64| Event {
            id: None,
            name: Some(name.to_string()),
            date: DateTime::from_millis(millis),
            duration: None,
        };
        let store = InMemoryCatalog::new(None, None).with_events(vec![
            event("open gym", 2_000_000),
            event("showcase", 1_000_000),
        ]);

        let events = upcoming_events(&store).await.unwrap();

        assert_eq!(events[0].name.as_deref(), Some("showcase"));
        assert_eq!(events[1].name.as_deref(), Some("open gym"));
    }
}
