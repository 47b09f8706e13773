//! Person and ministry lookups consumed by candidate resolution.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Error, Result};
use parish_roster_core::id::{EventId, MinistryId, PersonId};
use parish_roster_core::{Event, Loadable, MinistryPool, Person, Role, Visibility};
use serde::Deserialize;
use tracing::debug;

/// Read side of the parish directory.
pub trait PersonDirectory {
    /// Error type bubbled up from the backing directory.
    type Error: Into<Error>;

    /// Volunteer group members and coordinators of `ministry`.
    ///
    /// # Errors
    /// Returns a directory-specific error when the lookup fails.
    fn ministry_pool(&self, ministry: MinistryId) -> Result<Loadable<MinistryPool>, Self::Error>;

    /// Ministries `person` coordinates.
    ///
    /// # Errors
    /// Returns a directory-specific error when the lookup fails.
    fn coordinated_ministries(&self, person: PersonId) -> Result<Vec<MinistryId>, Self::Error>;

    /// Every volunteer, coordinator and admin on the platform.
    ///
    /// # Errors
    /// Returns a directory-specific error when the lookup fails.
    fn platform_pool(&self) -> Result<Vec<Person>, Self::Error>;

    /// A single person, if known.
    ///
    /// # Errors
    /// Returns a directory-specific error when the lookup fails.
    fn person(&self, id: PersonId) -> Result<Option<Person>, Self::Error>;
}

impl<D> PersonDirectory for &D
where
    D: PersonDirectory + ?Sized,
{
    type Error = D::Error;

    fn ministry_pool(&self, ministry: MinistryId) -> Result<Loadable<MinistryPool>, Self::Error> {
        (*self).ministry_pool(ministry)
    }

    fn coordinated_ministries(&self, person: PersonId) -> Result<Vec<MinistryId>, Self::Error> {
        (*self).coordinated_ministries(person)
    }

    fn platform_pool(&self) -> Result<Vec<Person>, Self::Error> {
        (*self).platform_pool()
    }

    fn person(&self, id: PersonId) -> Result<Option<Person>, Self::Error> {
        (*self).person(id)
    }
}

/// Ministry as listed in the directory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ministry {
    /// Ministry identifier.
    pub id: MinistryId,
    /// Display name.
    pub name: String,
    /// Members of the "Volunteers" group.
    pub volunteers: Vec<PersonId>,
    /// Coordinator roster.
    pub coordinators: Vec<PersonId>,
}

/// Directory loaded once from a TOML file.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    people: BTreeMap<PersonId, Person>,
    ministries: BTreeMap<MinistryId, Ministry>,
    events: BTreeMap<EventId, Event>,
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    people: Vec<PersonEntry>,
    #[serde(default)]
    ministries: Vec<MinistryEntry>,
    #[serde(default)]
    events: Vec<EventEntry>,
}

#[derive(Debug, Deserialize)]
struct PersonEntry {
    id: PersonId,
    first_name: String,
    #[serde(default)]
    last_name: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct MinistryEntry {
    id: MinistryId,
    name: String,
    #[serde(default)]
    volunteers: Vec<PersonId>,
    #[serde(default)]
    coordinators: Vec<PersonId>,
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    id: EventId,
    visibility: Visibility,
    #[serde(default)]
    ministry_id: Option<MinistryId>,
    #[serde(default)]
    requires_attendance: bool,
}

impl StaticDirectory {
    /// Load and validate a directory file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate a directory document.
    ///
    /// # Errors
    /// Returns an error on malformed TOML, duplicate ids or dangling references.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: DirectoryFile = toml::from_str(contents)?;
        let mut directory = Self::default();

        for entry in file.people {
            let person = Person::new(entry.id, entry.first_name, entry.last_name, entry.role);
            if directory.people.insert(person.id, person).is_some() {
                bail!("duplicate person id: {}", entry.id);
            }
        }

        for entry in file.ministries {
            let ministry = Ministry {
                id: entry.id,
                name: entry.name,
                volunteers: entry.volunteers,
                coordinators: entry.coordinators,
            };
            directory.insert_ministry(ministry)?;
        }

        for entry in file.events {
            let event = Event {
                id: entry.id,
                visibility: entry.visibility,
                ministry_id: entry.ministry_id,
                requires_attendance: entry.requires_attendance,
            };
            directory.insert_event(event)?;
        }

        Ok(directory)
    }

    /// Register a person, replacing any previous entry with the same id.
    pub fn insert_person(&mut self, person: Person) {
        self.people.insert(person.id, person);
    }

    /// Register a ministry whose members are already known.
    ///
    /// # Errors
    /// Returns an error for a duplicate id or an unknown member.
    pub fn insert_ministry(&mut self, ministry: Ministry) -> Result<()> {
        if self.ministries.contains_key(&ministry.id) {
            bail!("duplicate ministry id: {}", ministry.id);
        }
        for member in ministry.volunteers.iter().chain(&ministry.coordinators) {
            if !self.people.contains_key(member) {
                bail!("ministry '{}' lists unknown person {member}", ministry.name);
            }
        }
        self.ministries.insert(ministry.id, ministry);
        Ok(())
    }

    /// Register an event after checking its ministry.
    ///
    /// # Errors
    /// Returns an error for an invalid event, an unknown ministry or a duplicate id.
    pub fn insert_event(&mut self, event: Event) -> Result<()> {
        event.validate()?;
        if let Some(ministry) = event.ministry_id {
            if !self.ministries.contains_key(&ministry) {
                bail!("event {} refers to unknown ministry {ministry}", event.id);
            }
        }
        if self.events.insert(event.id, event.clone()).is_some() {
            bail!("duplicate event id: {}", event.id);
        }
        Ok(())
    }

    /// Look up an event.
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Look up a ministry.
    pub fn ministry(&self, id: MinistryId) -> Option<&Ministry> {
        self.ministries.get(&id)
    }

    fn people_of(&self, ids: &[PersonId]) -> Vec<Person> {
        ids.iter().filter_map(|id| self.people.get(id)).cloned().collect()
    }
}

impl PersonDirectory for StaticDirectory {
    type Error = Infallible;

    fn ministry_pool(&self, ministry: MinistryId) -> Result<Loadable<MinistryPool>, Self::Error> {
        let Some(entry) = self.ministries.get(&ministry) else {
            debug!(%ministry, "Unknown ministry has an empty pool");
            return Ok(Loadable::Ready(MinistryPool::default()));
        };
        Ok(Loadable::Ready(MinistryPool {
            volunteers: self.people_of(&entry.volunteers),
            coordinators: self.people_of(&entry.coordinators),
        }))
    }

    fn coordinated_ministries(&self, person: PersonId) -> Result<Vec<MinistryId>, Self::Error> {
        Ok(self
            .ministries
            .values()
            .filter(|m| m.coordinators.contains(&person))
            .map(|m| m.id)
            .collect())
    }

    fn platform_pool(&self) -> Result<Vec<Person>, Self::Error> {
        Ok(self
            .people
            .values()
            .filter(|p| p.role.serves_events())
            .cloned()
            .collect())
    }

    fn person(&self, id: PersonId) -> Result<Option<Person>, Self::Error> {
        Ok(self.people.get(&id).cloned())
    }
}
