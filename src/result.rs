//! Decoded search results.
use crate::{protocol::ResponseStatus, query::AttributeType};

/// How matches of one result are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchLayout {
    /// One entry per document id; a repeated id replaces the earlier entry
    /// in place.
    #[default]
    ById,
    /// Every match in arrival order, duplicates included. Grouping on a
    /// multi-valued attribute can return the same id more than once.
    List,
}

/// Attribute type as declared in a result schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Known(AttributeType),
    /// A tag this client does not recognize, kept as sent.
    Unknown(u32),
}

impl SchemaType {
    pub fn from_id(id: u32) -> Self {
        AttributeType::try_from(id)
            .map(SchemaType::Known)
            .unwrap_or(SchemaType::Unknown(id))
    }

    pub fn id(self) -> u32 {
        match self {
            SchemaType::Known(t) => t.id(),
            SchemaType::Unknown(id) => id,
        }
    }

    /// Unknown tags carry a plain 32-bit value.
    pub fn decoded_as(self) -> AttributeType {
        match self {
            SchemaType::Known(t) => t,
            SchemaType::Unknown(_) => AttributeType::Integer,
        }
    }
}

impl From<AttributeType> for SchemaType {
    fn from(value: AttributeType) -> Self {
        SchemaType::Known(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Integer, timestamp, ordinal, bool and unrecognized types.
    Uint(u32),
    Bigint(i64),
    Float(f32),
    String(Vec<u8>),
    Multi(Vec<u32>),
    Multi64(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: u64,
    pub weight: u32,
    /// Values in schema order.
    pub attrs: Vec<(String, AttrValue)>,
}

impl Match {
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordStats {
    pub docs: u32,
    pub hits: u32,
}

/// One record of a (possibly batched) search response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub status: u32,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub fields: Vec<String>,
    pub attrs: Vec<(String, SchemaType)>,
    pub matches: Vec<Match>,
    pub total: u32,
    pub total_found: u32,
    /// Seconds, millisecond resolution.
    pub time: f64,
    pub words: Vec<(String, WordStats)>,
}

impl SearchResult {
    pub fn status(&self) -> Option<ResponseStatus> {
        ResponseStatus::from_code(self.status)
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn word(&self, word: &str) -> Option<WordStats> {
        self.words
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, stats)| *stats)
    }
}
