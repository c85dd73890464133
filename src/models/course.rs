use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lesson::Lesson;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Front-end")]
    FrontEnd,
    #[serde(rename = "Back-end")]
    BackEnd,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FrontEnd => "Front-end",
            Category::BackEnd => "Back-end",
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front-end" => Ok(Category::FrontEnd),
            "back-end" => Ok(Category::BackEnd),
            _ => Err(ParseEnumError {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a course. Deleting a course only flips it to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Status::Active),
            "Inactive" => Ok(Status::Inactive),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub status: Status,
    pub lessons: Vec<Lesson>,
}

/// A course that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub category: Category,
    pub lessons: Vec<Lesson>,
}
