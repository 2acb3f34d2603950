//! Typed records for the legacy XML profile and connections documents.
//!
//! Every field is optional: a missing element, an element without text or an
//! element found at an unexpected depth leaves the field empty instead of
//! failing the whole record.

use chrono::NaiveDate;

use crate::xml::Element;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub location_country: Option<String>,
    pub industry: Option<String>,
    pub summary: Option<String>,
    pub specialties: Option<String>,
    pub interests: Option<String>,
    pub honors: Option<String>,
    pub positions: Vec<Position>,
    pub educations: Vec<Education>,
    pub public_url: Option<String>,
    pub private_url: Option<String>,
    pub picture_url: Option<String>,
    pub current_status: Option<String>,
    pub languages: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub company: Option<String>,
    pub is_current: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Education {
    pub id: Option<String>,
    pub school_name: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub activities: Option<String>,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Profile {
    /// Parses a profile document.
    ///
    /// Returns `Ok(None)` when the document holds no `person` element and a
    /// parse error only when the XML itself is malformed.
    pub fn from_xml(xml: &str) -> Result<Option<Profile>> {
        let root = Element::parse(xml)?;
        let person = if root.name() == "person" {
            Some(&root)
        } else {
            root.first_descendant("person")
        };
        Ok(person.map(Profile::from_element))
    }

    /// Parses a connections document into one profile per `person`.
    pub fn connections_from_xml(xml: &str) -> Result<Vec<Profile>> {
        let root = Element::parse(xml)?;
        Ok(root
            .descendants("person")
            .into_iter()
            .map(Profile::from_element)
            .collect())
    }

    pub fn from_element(person: &Element) -> Profile {
        let location = person.child("location");
        Profile {
            id: person.child_text("id"),
            first_name: person.child_text("first-name"),
            last_name: person.child_text("last-name"),
            headline: person.child_text("headline"),
            location: location.and_then(|l| l.child_text("name")),
            location_country: location
                .and_then(|l| l.child("country"))
                .and_then(|c| c.child_text("code")),
            industry: person.child_text("industry"),
            summary: person.child_text("summary"),
            specialties: person.child_text("specialties"),
            interests: person.child_text("interests"),
            honors: person.child_text("honors"),
            positions: person
                .child("positions")
                .map(Position::list_from)
                .unwrap_or_default(),
            educations: person
                .child("educations")
                .map(Education::list_from)
                .unwrap_or_default(),
            public_url: person.child_text("public-profile-url").map(unescape),
            private_url: person
                .child("site-standard-profile-request")
                .and_then(|r| r.child_text("url")),
            picture_url: person.child_text("picture-url").map(unescape),
            current_status: person.child_text("current-status"),
            languages: named_entries(person, "languages", "language"),
            skills: named_entries(person, "skills", "skill"),
        }
    }
}

impl Position {
    pub fn list_from(positions: &Element) -> Vec<Position> {
        positions
            .descendants("position")
            .into_iter()
            .map(|node| Position {
                id: node.descendant_text("id"),
                title: node.descendant_text("title"),
                summary: node.descendant_text("summary"),
                company: node
                    .first_descendant("company")
                    .and_then(|c| c.descendant_text("name")),
                is_current: node
                    .descendant_text("is-current")
                    .and_then(|v| v.trim().parse().ok()),
                start_date: date_from(node.first_descendant("start-date")),
                end_date: date_from(node.first_descendant("end-date")),
            })
            .collect()
    }
}

impl Education {
    pub fn list_from(educations: &Element) -> Vec<Education> {
        educations
            .descendants("education")
            .into_iter()
            .map(|node| Education {
                id: node.descendant_text("id"),
                school_name: node.descendant_text("school-name"),
                degree: node.descendant_text("degree"),
                field_of_study: node.descendant_text("field-of-study"),
                activities: node.descendant_text("activities"),
                notes: node.descendant_text("notes"),
                start_date: date_from(node.first_descendant("start-date")),
                end_date: date_from(node.first_descendant("end-date")),
            })
            .collect()
    }
}

/// Names of the `entry` elements under `container`.
///
/// Entries carrying an `id` are references to another record and have no
/// display name of their own, so they are skipped.
fn named_entries(person: &Element, container: &str, entry: &str) -> Vec<String> {
    let container = match person.child(container) {
        Some(container) => container,
        None => return Vec::new(),
    };
    container
        .descendants(entry)
        .into_iter()
        .filter(|e| e.first_descendant("id").is_none())
        .filter_map(|e| e.child_text("name"))
        .collect()
}

/// Year-only blocks give January 1st; a valid month moves the date to the
/// first of that month.
fn date_from(block: Option<&Element>) -> Option<NaiveDate> {
    let block = block?;
    let year: i32 = block.descendant_text("year")?.trim().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let month = block
        .descendant_text("month")
        .and_then(|m| m.trim().parse::<u32>().ok())
        .and_then(|m| NaiveDate::from_ymd_opt(year, m, 1));
    Some(month.unwrap_or(date))
}

// URLs in these documents are sometimes escaped twice
fn unescape(url: String) -> String {
    match quick_xml::escape::unescape(&url) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => url,
    }
}
