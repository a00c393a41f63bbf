//! Bodies and reply decoders for the single-shot commands.
use std::collections::BTreeMap;

use crate::{
    error::{ProtocolError, ValidationError},
    result::WordStats,
};

use super::frame::{FrameReader, FrameWriter};

/// Snippet generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptOptions {
    pub before_match: String,
    pub after_match: String,
    pub chunk_separator: String,
    pub limit: u32,
    pub around: u32,
    pub limit_passages: u32,
    pub limit_words: u32,
    pub start_passage_id: u32,
    pub html_strip_mode: String,
    pub passage_boundary: String,
    pub exact_phrase: bool,
    pub single_passage: bool,
    pub use_boundaries: bool,
    pub weight_order: bool,
    pub query_mode: bool,
    pub force_all_words: bool,
    pub load_files: bool,
    pub allow_empty: bool,
    pub emit_zones: bool,
    pub load_files_scattered: bool,
}

impl Default for ExcerptOptions {
    fn default() -> Self {
        Self {
            before_match: "<b>".into(),
            after_match: "</b>".into(),
            chunk_separator: " ... ".into(),
            limit: 256,
            around: 5,
            limit_passages: 0,
            limit_words: 0,
            start_passage_id: 1,
            html_strip_mode: "index".into(),
            passage_boundary: "none".into(),
            exact_phrase: false,
            single_passage: false,
            use_boundaries: false,
            weight_order: false,
            query_mode: false,
            force_all_words: false,
            load_files: false,
            allow_empty: false,
            emit_zones: false,
            load_files_scattered: false,
        }
    }
}

impl ExcerptOptions {
    /// Packs the boolean options. Bit 0 (remove spaces) is always set.
    pub fn flags(&self) -> u32 {
        [
            (self.exact_phrase, 2),
            (self.single_passage, 4),
            (self.use_boundaries, 8),
            (self.weight_order, 16),
            (self.query_mode, 32),
            (self.force_all_words, 64),
            (self.load_files, 128),
            (self.allow_empty, 256),
            (self.emit_zones, 512),
            (self.load_files_scattered, 1024),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(1, |flags, (_, bit)| flags | bit)
    }
}

pub fn encode_excerpts<D: AsRef<[u8]>>(
    docs: &[D],
    index: &str,
    words: &str,
    opts: &ExcerptOptions,
) -> Result<Vec<u8>, ValidationError> {
    if docs.is_empty() {
        return Err(ValidationError::NoDocuments);
    }

    let mut w = FrameWriter::new();
    w.put_u32(0).put_u32(opts.flags());
    w.put_str(index).put_str(words);
    w.put_str(&opts.before_match)
        .put_str(&opts.after_match)
        .put_str(&opts.chunk_separator);
    w.put_u32(opts.limit).put_u32(opts.around);
    w.put_u32(opts.limit_passages)
        .put_u32(opts.limit_words)
        .put_u32(opts.start_passage_id);
    w.put_str(&opts.html_strip_mode)
        .put_str(&opts.passage_boundary);

    w.put_u32(docs.len() as u32);
    for doc in docs {
        w.put_str(doc);
    }
    Ok(w.into_vec())
}

/// One snippet per requested document, in request order.
pub fn parse_excerpts(payload: &[u8], ndocs: usize) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut reader = FrameReader::new(payload);
    (0..ndocs)
        .map(|_| {
            reader
                .prefixed()
                .map(<[u8]>::to_vec)
                .map_err(|_| ProtocolError::IncompleteReply)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub tokenized: String,
    pub normalized: String,
    /// Present when hit statistics were requested.
    pub stats: Option<WordStats>,
}

pub fn encode_keywords(query: &str, index: &str, hits: bool) -> Vec<u8> {
    let mut w = FrameWriter::new();
    w.put_str(query).put_str(index).put_bool(hits);
    w.into_vec()
}

pub fn parse_keywords(payload: &[u8], hits: bool) -> Result<Vec<Keyword>, ProtocolError> {
    let mut reader = FrameReader::new(payload);
    let nwords = reader.u32().map_err(|_| ProtocolError::IncompleteReply)?;

    let mut out = Vec::new();
    for _ in 0..nwords {
        let keyword =
            read_keyword(&mut reader, hits).map_err(|_| ProtocolError::IncompleteReply)?;
        out.push(keyword);
    }
    Ok(out)
}

fn read_keyword(reader: &mut FrameReader<'_>, hits: bool) -> Result<Keyword, ProtocolError> {
    let tokenized = reader.string()?;
    let normalized = reader.string()?;
    let stats = if hits {
        Some(WordStats {
            docs: reader.u32()?,
            hits: reader.u32()?,
        })
    } else {
        None
    };
    Ok(Keyword {
        tokenized,
        normalized,
        stats,
    })
}

/// New attribute values, keyed by document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateValues {
    /// One value per attribute.
    Scalar(BTreeMap<u64, Vec<u32>>),
    /// One value list per multi-valued attribute.
    Multi(BTreeMap<u64, Vec<Vec<u32>>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUpdate {
    pub index: String,
    pub attributes: Vec<String>,
    pub values: UpdateValues,
}

impl AttributeUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.attributes.is_empty() {
            return Err(ValidationError::NoAttributes {
                index: self.index.clone(),
            });
        }

        let expected = self.attributes.len();
        let mismatch = match &self.values {
            UpdateValues::Scalar(docs) => docs
                .iter()
                .map(|(id, v)| (*id, v.len()))
                .find(|(_, n)| *n != expected),
            UpdateValues::Multi(docs) => docs
                .iter()
                .map(|(id, v)| (*id, v.len()))
                .find(|(_, n)| *n != expected),
        };

        match mismatch {
            Some((id, actual)) => Err(ValidationError::ValueCount {
                id,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }

    fn is_multi(&self) -> bool {
        matches!(self.values, UpdateValues::Multi(_))
    }
}

pub fn encode_update(update: &AttributeUpdate) -> Result<Vec<u8>, ValidationError> {
    update.validate()?;

    let mut w = FrameWriter::new();
    w.put_str(&update.index);
    w.put_u32(update.attributes.len() as u32);
    for attr in &update.attributes {
        w.put_str(attr).put_bool(update.is_multi());
    }

    match &update.values {
        UpdateValues::Scalar(docs) => {
            w.put_u32(docs.len() as u32);
            for (id, values) in docs {
                w.put_u64(*id);
                for v in values {
                    w.put_u32(*v);
                }
            }
        }
        UpdateValues::Multi(docs) => {
            w.put_u32(docs.len() as u32);
            for (id, lists) in docs {
                w.put_u64(*id);
                for list in lists {
                    w.put_u32(list.len() as u32);
                    for v in list {
                        w.put_u32(*v);
                    }
                }
            }
        }
    }
    Ok(w.into_vec())
}

/// Number of rows the daemon updated.
pub fn parse_update(payload: &[u8]) -> Result<u32, ProtocolError> {
    FrameReader::new(payload).u32()
}

/// STATUS and PERSIST share the same one-word body.
pub fn encode_status() -> Vec<u8> {
    let mut w = FrameWriter::with_capacity(4);
    w.put_u32(1);
    w.into_vec()
}

pub fn encode_persist() -> Vec<u8> {
    encode_status()
}

/// Status table, `rows × cols` cells.
pub fn parse_status(payload: &[u8]) -> Result<Vec<Vec<String>>, ProtocolError> {
    let mut reader = FrameReader::new(payload);
    let rows = reader.u32()?;
    let cols = reader.u32()?;

    let mut table = Vec::new();
    for _ in 0..rows {
        let row = (0..cols)
            .map(|_| reader.string())
            .collect::<Result<Vec<_>, _>>()?;
        table.push(row);
    }
    Ok(table)
}

pub fn parse_flush(payload: &[u8]) -> Result<u32, ProtocolError> {
    if payload.len() != 4 {
        return Err(ProtocolError::UnexpectedLength {
            expected: 4,
            actual: payload.len(),
        });
    }
    FrameReader::new(payload).u32()
}
