//! People and participant name resolution.
//!
//! The engine only needs a person's id to look up availability; display data
//! lives here so callers can hand a [`Roster`] straight to the exporter.

use serde::{Deserialize, Serialize};

/// Opaque person identifier.
pub type PersonId = u32;

/// A person who can be invited to a meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Short avatar text. Derived from `name` when left empty.
    #[serde(default)]
    pub initials: String,
    /// Free-form visual tag (a color name in the planner UI).
    #[serde(default)]
    pub tag: String,
}

impl Person {
    /// Create a person, deriving initials from the first letter of each word
    /// in `name` ("Alex Kim" → "AK").
    pub fn new(id: PersonId, name: impl Into<String>, tag: impl Into<String>) -> Self {
        let name = name.into();
        let initials = initials_of(&name);
        Self {
            id,
            name,
            initials,
            tag: tag.into(),
        }
    }
}

fn initials_of(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Resolves a participant id to a display name.
///
/// Returning `None` is not an error: the exporter simply leaves the
/// participant out of the description.
pub trait NameResolver {
    fn display_name(&self, id: PersonId) -> Option<String>;
}

impl<F> NameResolver for F
where
    F: Fn(PersonId) -> Option<String>,
{
    fn display_name(&self, id: PersonId) -> Option<String> {
        self(id)
    }
}

/// An ordered list of known people.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Person>", into = "Vec<Person>")]
pub struct Roster {
    people: Vec<Person>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person. A person with the same id is replaced in place.
    pub fn add(&mut self, mut person: Person) {
        if person.initials.is_empty() {
            person.initials = initials_of(&person.name);
        }
        match self.people.iter_mut().find(|p| p.id == person.id) {
            Some(existing) => *existing = person,
            None => self.people.push(person),
        }
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl From<Vec<Person>> for Roster {
    fn from(people: Vec<Person>) -> Self {
        let mut roster = Roster::new();
        for person in people {
            roster.add(person);
        }
        roster
    }
}

impl From<Roster> for Vec<Person> {
    fn from(roster: Roster) -> Self {
        roster.people
    }
}

impl NameResolver for Roster {
    fn display_name(&self, id: PersonId) -> Option<String> {
        self.get(id).map(|p| p.name.clone())
    }
}
