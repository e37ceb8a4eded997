//! Fruit documents.
//!
//! A stored fruit is an id plus a [`FruitDoc`] body. The body keeps every field
//! optional so a partial update can be expressed as "only the fields that are set".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name and color of the fixed seed set, in insertion order.
pub const SEED_FRUITS: &[(&str, &str)] = &[
    ("Orange", "orange"),
    ("Grape", "purple"),
    ("Banana", "orange"),
    ("Strawberry", "red"),
    ("Coconut", "brown"),
];

/// One inventory item as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fruit {
    pub id: Uuid,
    pub name: Option<String>,
    pub color: Option<String>,
    pub ready_to_eat: Option<bool>,
}

impl Fruit {
    pub fn from_doc(id: Uuid, doc: FruitDoc) -> Self {
        Self {
            id,
            name: doc.name,
            color: doc.color,
            ready_to_eat: doc.ready_to_eat,
        }
    }

    pub fn is_ready_to_eat(&self) -> bool {
        self.ready_to_eat.unwrap_or(false)
    }
}

/// Document body persisted in the `doc` column. Unset fields are omitted from the JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_eat: Option<bool>,
}

impl FruitDoc {
    /// Overwrite the fields that are set in `patch`; leave the rest untouched.
    pub fn merge(&mut self, patch: FruitDoc) {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if patch.color.is_some() {
            self.color = patch.color;
        }
        if patch.ready_to_eat.is_some() {
            self.ready_to_eat = patch.ready_to_eat;
        }
    }
}

/// Raw URL-encoded form as submitted by the create and edit pages.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FruitForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Checkbox value; browsers send `on` when checked and nothing otherwise.
    #[serde(default, rename = "readyToEat")]
    pub ready_to_eat: Option<String>,
}

impl FruitForm {
    pub fn into_input(self) -> FruitInput {
        FruitInput {
            name: self.name,
            color: self.color,
            ready_to_eat: self.ready_to_eat.as_deref() == Some("on"),
        }
    }
}

/// Form data after checkbox coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FruitInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub ready_to_eat: bool,
}

impl From<FruitInput> for FruitDoc {
    fn from(input: FruitInput) -> Self {
        Self {
            name: input.name,
            color: input.color,
            ready_to_eat: Some(input.ready_to_eat),
        }
    }
}

pub fn seed_docs() -> Vec<FruitDoc> {
    SEED_FRUITS
        .iter()
        .map(|(name, color)| FruitDoc {
            name: Some((*name).to_string()),
            color: Some((*color).to_string()),
            ready_to_eat: Some(false),
        })
        .collect()
}
