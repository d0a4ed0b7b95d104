//! Material (circulating item) model: books and periodicals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Discriminant stored in the `kind` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Book,
    Periodical,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Book => "book",
            MaterialKind::Periodical => "periodical",
        }
    }
}

impl std::str::FromStr for MaterialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(MaterialKind::Book),
            "periodical" => Ok(MaterialKind::Periodical),
            other => Err(format!("unknown material kind '{}'", other)),
        }
    }
}

/// Variant-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialDetails {
    Book {
        isbn: String,
        publication_year: i32,
        /// Authors in credit order
        author_ids: Vec<i32>,
    },
    Periodical {
        edition_number: i32,
        recurrence: String,
    },
}

/// A circulating item with its copy counters.
///
/// `total` and `available` are nullable because rows imported from older
/// catalogs may lack them; such materials are never considered on loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Material {
    pub id: i32,
    pub title: String,
    pub total: Option<i32>,
    pub available: Option<i32>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: MaterialDetails,
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self.details {
            MaterialDetails::Book { .. } => MaterialKind::Book,
            MaterialDetails::Periodical { .. } => MaterialKind::Periodical,
        }
    }

    /// Authors of a book; empty for periodicals
    pub fn author_ids(&self) -> &[i32] {
        match &self.details {
            MaterialDetails::Book { author_ids, .. } => author_ids,
            MaterialDetails::Periodical { .. } => &[],
        }
    }

    /// Copies currently out, when both counters are known
    pub fn copies_on_loan(&self) -> Option<i32> {
        match (self.total, self.available) {
            (Some(total), Some(available)) => Some(total - available),
            _ => None,
        }
    }
}

/// Material about to be inserted; intake sets `available = total`
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub total: i32,
    pub details: MaterialDetails,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "A book must have a title"))]
    pub title: String,
    #[validate(length(min = 1, message = "A book must have an ISBN"))]
    pub isbn: String,
    pub publication_year: i32,
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: i32,
    /// Author names; unknown names are registered as new authors
    pub author_names: Vec<String>,
}

/// Update book request. Authors named here must already exist.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "A book must have a title"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "A book must have an ISBN"))]
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub author_names: Option<Vec<String>>,
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: Option<i32>,
}

/// Create periodical request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePeriodical {
    #[validate(length(min = 1, message = "A periodical must have a title"))]
    pub title: String,
    pub edition_number: i32,
    #[validate(length(min = 1, message = "A periodical must have a recurrence"))]
    pub recurrence: String,
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: i32,
}

/// Update periodical request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePeriodical {
    #[validate(length(min = 1, message = "A periodical must have a title"))]
    pub title: Option<String>,
    pub edition_number: Option<i32>,
    #[validate(length(min = 1, message = "A periodical must have a recurrence"))]
    pub recurrence: Option<String>,
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: Option<i32>,
}
