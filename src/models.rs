use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Which singleton catalog document to read.
///
/// The two catalogs live in separate collections, not behind a field, so
/// the variant picks the storage location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogKind {
    Signups,
    Upcoming,
}

impl CatalogKind {
    pub fn collection(self) -> &'static str {
        match self {
            CatalogKind::Signups => "gymnastics",
            CatalogKind::Upcoming => "upcoming",
        }
    }
}

/// A child+parent registration record attached to a session.
///
/// There is no id field. Within one session a signee is identified by the
/// (childFirstName, childLastName) pair, compared case-insensitively.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Signee {
    pub child_first_name: String,
    pub child_last_name: String,
    pub parent_first_name: String,
    pub parent_last_name: String,
    pub parent_phone_number: String,
}

impl Signee {
    /// Child names are stored lowercased, so one session can never hold
    /// "Ana Lee" and "ana lee" as distinct signees.
    pub fn normalized(&self) -> Signee {
        Signee {
            child_first_name: self.child_first_name.to_lowercase(),
            child_last_name: self.child_last_name.to_lowercase(),
            parent_first_name: self.parent_first_name.clone(),
            parent_last_name: self.parent_last_name.clone(),
            parent_phone_number: self.parent_phone_number.clone(),
        }
    }
}

/// A (day, time) offering of a class with bounded capacity.
///
/// `signees.len() <= max_signups` must hold after every successful
/// registration. The (day, time) pair is unique within a class by
/// convention only, not by schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub day: String,
    pub time: String,
    pub max_signups: u32,
    pub price: f64,
    #[serde(default)]
    pub signees: Vec<Signee>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Class {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// One singleton catalog document: every class, session and signee for
/// either live signups or upcoming offerings. Seeded out-of-band; the
/// signup append is the only mutation this service performs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub season: String,
    #[serde(default)]
    pub classes: Vec<Class>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub date: DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Wire payload for `POST /class-signup`. Fields default to empty so a
/// missing field surfaces as a per-field validation error instead of a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    pub class_name: String,
    pub day: String,
    pub time: String,
    pub signee: Signee,
}

/// Read-side projection of a session. The signee list collapses to its
/// count so the aggregate view never carries personal data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub day: String,
    pub time: String,
    pub max_signups: u32,
    pub price: f64,
    pub signees: usize,
}

#[derive(Debug, Serialize)]
pub struct ClassView {
    pub id: u32,
    pub name: String,
    pub sessions: Vec<SessionView>,
}

#[derive(Debug, Serialize)]
pub struct CatalogView {
    pub season: String,
    pub classes: Vec<ClassView>,
}

#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            day: session.day,
            time: session.time,
            max_signups: session.max_signups,
            price: session.price,
            signees: session.signees.len(),
        }
    }
}

impl From<Class> for ClassView {
    fn from(class: Class) -> Self {
        Self {
            id: class.id,
            name: class.name,
            sessions: class.sessions.into_iter().map(SessionView::from).collect(),
        }
    }
}

impl From<Catalog> for CatalogView {
    fn from(catalog: Catalog) -> Self {
        Self {
            season: catalog.season,
            classes: catalog.classes.into_iter().map(ClassView::from).collect(),
        }
    }
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let date = event
            .date
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| event.date.to_string());

        Self {
            name: event.name,
            date,
            duration: event.duration,
        }
    }
}
