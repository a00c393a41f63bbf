//! Search query configuration.
//!
//! [`QueryRequest`] holds everything the daemon needs to run one search:
//! paging, matching and ranking modes, sorting, filters, grouping, weights,
//! the geo anchor and attribute overrides. Setters validate their input so a
//! request that reaches the encoder is always well formed.
//!
//! # Example
//! ```rust
//! use sift::query::{Filter, QueryRequest, Ranker, SortMode};
//!
//! let mut request = QueryRequest::new("hello world");
//! request
//!     .set_index("articles")
//!     .set_limits(0, 50, 1000, 0)
//!     .unwrap()
//!     .set_sort_mode(SortMode::AttrDesc, "published_at")
//!     .unwrap()
//!     .set_ranking_mode(Ranker::Bm25, "");
//! request.add_filter(Filter::values("author_id", vec![3, 7], false)).unwrap();
//! ```
use std::collections::BTreeMap;

use crate::error::ValidationError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident = $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn id(self) -> u32 {
                match self {
                    $($name::$variant => $id),+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ValidationError;

            fn try_from(value: u32) -> Result<Self, ValidationError> {
                match value {
                    $($id => Ok($name::$variant),)+
                    id => Err(ValidationError::UnknownId { kind: $kind, id }),
                }
            }
        }
    };
}

wire_enum!(
    /// How query words are matched against documents.
    MatchMode, "match mode" {
        All = 0,
        Any = 1,
        Phrase = 2,
        Boolean = 3,
        Extended = 4,
        FullScan = 5,
        Extended2 = 6,
    }
);

wire_enum!(
    /// Ranking function. Only [`Ranker::Expr`] takes an expression.
    Ranker, "ranker" {
        ProximityBm25 = 0,
        Bm25 = 1,
        None = 2,
        WordCount = 3,
        Proximity = 4,
        MatchAny = 5,
        FieldMask = 6,
        Sph04 = 7,
        Expr = 8,
    }
);

wire_enum!(
    SortMode, "sort mode" {
        Relevance = 0,
        AttrDesc = 1,
        AttrAsc = 2,
        TimeSegments = 3,
        Extended = 4,
        Expr = 5,
    }
);

wire_enum!(
    GroupFunc, "group function" {
        Day = 0,
        Week = 1,
        Month = 2,
        Year = 3,
        Attr = 4,
        AttrPair = 5,
    }
);

wire_enum!(
    /// Declared type of an attribute in a result schema. Multi-value tags
    /// carry bit 30 of the type word.
    AttributeType, "attribute type" {
        Integer = 1,
        Timestamp = 2,
        Ordinal = 3,
        Bool = 4,
        Float = 5,
        Bigint = 6,
        String = 7,
        Multi = 0x4000_0001,
        Multi64 = 0x4000_0002,
    }
);

impl Ranker {
    /// Whether the daemon expects a ranking expression after the ranker id.
    pub fn takes_expression(self) -> bool {
        self == Ranker::Expr
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Values {
        attribute: String,
        values: Vec<i64>,
        exclude: bool,
    },
    Range {
        attribute: String,
        min: i64,
        max: i64,
        exclude: bool,
    },
    FloatRange {
        attribute: String,
        min: f32,
        max: f32,
        exclude: bool,
    },
}

impl Filter {
    pub fn values(attribute: impl Into<String>, values: Vec<i64>, exclude: bool) -> Self {
        Filter::Values {
            attribute: attribute.into(),
            values,
            exclude,
        }
    }

    pub fn range(attribute: impl Into<String>, min: i64, max: i64, exclude: bool) -> Self {
        Filter::Range {
            attribute: attribute.into(),
            min,
            max,
            exclude,
        }
    }

    pub fn float_range(attribute: impl Into<String>, min: f32, max: f32, exclude: bool) -> Self {
        Filter::FloatRange {
            attribute: attribute.into(),
            min,
            max,
            exclude,
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            Filter::Values { attribute, .. }
            | Filter::Range { attribute, .. }
            | Filter::FloatRange { attribute, .. } => attribute,
        }
    }

    pub fn exclude(&self) -> bool {
        match self {
            Filter::Values { exclude, .. }
            | Filter::Range { exclude, .. }
            | Filter::FloatRange { exclude, .. } => *exclude,
        }
    }

    /// Wire tag: VALUES 0, RANGE 1, FLOATRANGE 2.
    pub fn type_id(&self) -> u32 {
        match self {
            Filter::Values { .. } => 0,
            Filter::Range { .. } => 1,
            Filter::FloatRange { .. } => 2,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let inverted = match self {
            Filter::Values { attribute, values, .. } => {
                if values.is_empty() {
                    return Err(ValidationError::EmptyValues {
                        attribute: attribute.clone(),
                    });
                }
                false
            }
            Filter::Range { min, max, .. } => min > max,
            Filter::FloatRange { min, max, .. } => min > max || min.is_nan() || max.is_nan(),
        };

        if inverted {
            return Err(ValidationError::InvertedRange {
                name: self.attribute().to_string(),
            });
        }
        Ok(())
    }
}

/// Reference point for geodistance calculations, coordinates in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoAnchor {
    pub lat_attr: String,
    pub long_attr: String,
    pub lat: f32,
    pub long: f32,
}

/// Per-document replacement values, typed by the attribute they override.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideValues {
    Integer(BTreeMap<u64, u32>),
    Timestamp(BTreeMap<u64, u32>),
    Bool(BTreeMap<u64, bool>),
    Float(BTreeMap<u64, f32>),
    Bigint(BTreeMap<u64, i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeOverride {
    pub attribute: String,
    pub values: OverrideValues,
}

impl AttributeOverride {
    pub fn new(attribute: impl Into<String>, values: OverrideValues) -> Self {
        Self {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn attr_type(&self) -> AttributeType {
        match self.values {
            OverrideValues::Integer(_) => AttributeType::Integer,
            OverrideValues::Timestamp(_) => AttributeType::Timestamp,
            OverrideValues::Bool(_) => AttributeType::Bool,
            OverrideValues::Float(_) => AttributeType::Float,
            OverrideValues::Bigint(_) => AttributeType::Bigint,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            OverrideValues::Integer(v) | OverrideValues::Timestamp(v) => v.len(),
            OverrideValues::Bool(v) => v.len(),
            OverrideValues::Float(v) => v.len(),
            OverrideValues::Bigint(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub(crate) query: String,
    pub(crate) index: String,
    pub(crate) comment: String,
    pub(crate) offset: u32,
    pub(crate) limit: u32,
    pub(crate) match_mode: MatchMode,
    pub(crate) ranker: Ranker,
    pub(crate) rank_expr: String,
    pub(crate) sort_mode: SortMode,
    pub(crate) sort_by: String,
    pub(crate) weights: Vec<u32>,
    pub(crate) min_id: u64,
    pub(crate) max_id: u64,
    pub(crate) filters: Vec<Filter>,
    pub(crate) group_func: GroupFunc,
    pub(crate) group_by: String,
    pub(crate) group_sort: String,
    pub(crate) group_distinct: String,
    pub(crate) max_matches: u32,
    pub(crate) cutoff: u32,
    pub(crate) retry_count: u32,
    pub(crate) retry_delay: u32,
    pub(crate) anchor: Option<GeoAnchor>,
    pub(crate) index_weights: BTreeMap<String, u32>,
    pub(crate) max_query_time: u32,
    pub(crate) field_weights: BTreeMap<String, u32>,
    pub(crate) overrides: Vec<AttributeOverride>,
    pub(crate) select: String,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            index: "*".into(),
            comment: String::new(),
            offset: 0,
            limit: 20,
            match_mode: MatchMode::All,
            ranker: Ranker::ProximityBm25,
            rank_expr: String::new(),
            sort_mode: SortMode::Relevance,
            sort_by: String::new(),
            weights: Vec::new(),
            min_id: 0,
            max_id: 0,
            filters: Vec::new(),
            group_func: GroupFunc::Day,
            group_by: String::new(),
            group_sort: "@group desc".into(),
            group_distinct: String::new(),
            max_matches: 1000,
            cutoff: 0,
            retry_count: 0,
            retry_delay: 0,
            anchor: None,
            index_weights: BTreeMap::new(),
            max_query_time: 0,
            field_weights: BTreeMap::new(),
            overrides: Vec::new(),
            select: "*".into(),
        }
    }
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> &mut Self {
        self.query = query.into();
        self
    }

    /// Index pattern, `*` for all local indexes.
    pub fn set_index(&mut self, index: impl Into<String>) -> &mut Self {
        self.index = index.into();
        self
    }

    /// Free-text comment that shows up in the daemon's query log.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = comment.into();
        self
    }

    /// Sets paging. A zero `max_matches` or `cutoff` keeps the previous value.
    pub fn set_limits(
        &mut self,
        offset: u32,
        limit: u32,
        max_matches: u32,
        cutoff: u32,
    ) -> Result<&mut Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::Limits {
                reason: "limit must be positive",
            });
        }
        self.offset = offset;
        self.limit = limit;
        if max_matches > 0 {
            self.max_matches = max_matches;
        }
        if cutoff > 0 {
            self.cutoff = cutoff;
        }
        Ok(self)
    }

    /// Milliseconds; zero disables the limit.
    pub fn set_max_query_time(&mut self, millis: u32) -> &mut Self {
        self.max_query_time = millis;
        self
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) -> &mut Self {
        self.match_mode = mode;
        self
    }

    /// The expression is only kept (and only sent) for [`Ranker::Expr`].
    pub fn set_ranking_mode(&mut self, ranker: Ranker, expr: impl Into<String>) -> &mut Self {
        self.ranker = ranker;
        self.rank_expr = if ranker.takes_expression() {
            expr.into()
        } else {
            String::new()
        };
        self
    }

    pub fn set_sort_mode(
        &mut self,
        mode: SortMode,
        sort_by: impl Into<String>,
    ) -> Result<&mut Self, ValidationError> {
        let sort_by = sort_by.into();
        if mode != SortMode::Relevance && sort_by.is_empty() {
            return Err(ValidationError::MissingSortBy(mode));
        }
        self.sort_mode = mode;
        self.sort_by = sort_by;
        Ok(self)
    }

    /// Positional field weights, aligned with the index's field order.
    pub fn set_weights(&mut self, weights: Vec<u32>) -> &mut Self {
        self.weights = weights;
        self
    }

    pub fn set_field_weights(&mut self, weights: BTreeMap<String, u32>) -> &mut Self {
        self.field_weights = weights;
        self
    }

    pub fn set_index_weights(&mut self, weights: BTreeMap<String, u32>) -> &mut Self {
        self.index_weights = weights;
        self
    }

    /// Restricts matches to document ids in `min..=max`; `0, 0` lifts it.
    pub fn set_id_range(&mut self, min: u64, max: u64) -> Result<&mut Self, ValidationError> {
        if min > max {
            return Err(ValidationError::InvertedRange {
                name: "document id".into(),
            });
        }
        self.min_id = min;
        self.max_id = max;
        Ok(self)
    }

    pub fn add_filter(&mut self, filter: Filter) -> Result<&mut Self, ValidationError> {
        filter.validate()?;
        self.filters.push(filter);
        Ok(self)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn reset_filters(&mut self) -> &mut Self {
        self.filters.clear();
        self.anchor = None;
        self
    }

    pub fn set_geo_anchor(
        &mut self,
        lat_attr: impl Into<String>,
        long_attr: impl Into<String>,
        lat: f32,
        long: f32,
    ) -> &mut Self {
        self.anchor = Some(GeoAnchor {
            lat_attr: lat_attr.into(),
            long_attr: long_attr.into(),
            lat,
            long,
        });
        self
    }

    pub fn set_group_by(
        &mut self,
        attribute: impl Into<String>,
        func: GroupFunc,
        group_sort: impl Into<String>,
    ) -> &mut Self {
        self.group_by = attribute.into();
        self.group_func = func;
        self.group_sort = group_sort.into();
        self
    }

    pub fn set_group_distinct(&mut self, attribute: impl Into<String>) -> &mut Self {
        self.group_distinct = attribute.into();
        self
    }

    pub fn reset_group_by(&mut self) -> &mut Self {
        self.group_by.clear();
        self.group_func = GroupFunc::Day;
        self.group_sort = "@group desc".into();
        self.group_distinct.clear();
        self
    }

    /// Distributed-index retry settings, forwarded to the daemon as is.
    pub fn set_retries(&mut self, count: u32, delay: u32) -> &mut Self {
        self.retry_count = count;
        self.retry_delay = delay;
        self
    }

    /// Adds or replaces the override for `o.attribute`.
    pub fn set_override(&mut self, o: AttributeOverride) -> &mut Self {
        match self
            .overrides
            .iter_mut()
            .find(|existing| existing.attribute == o.attribute)
        {
            Some(existing) => *existing = o,
            None => self.overrides.push(o),
        }
        self
    }

    pub fn reset_overrides(&mut self) -> &mut Self {
        self.overrides.clear();
        self
    }

    pub fn set_select(&mut self, select: impl Into<String>) -> &mut Self {
        self.select = select.into();
        self
    }
}

/// Escapes the characters that carry meaning in extended query syntax.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(
            ch,
            '\\' | '(' | ')' | '|' | '-' | '!' | '@' | '~' | '"' | '&' | '/' | '^' | '$' | '='
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
