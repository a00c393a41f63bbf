//! Batched search response decoding.
//!
//! A SEARCH response body holds one record per query of the batch, back to
//! back, with no per-record length. Each record is:
//!
//! ```text
//! u32 status [u32 len, message]           message only when status != OK
//! u32 nfields, str × nfields
//! u32 nattrs, (str name, u32 type) × nattrs
//! u32 nmatches, u32 id64
//! match × nmatches: id (u64 if id64, else u32), u32 weight, value per attr
//! u32 total, u32 total_found, u32 msecs, u32 nwords
//! (str word, u32 docs, u32 hits) × nwords
//! ```
//!
//! Records whose status is neither OK nor WARNING stop right after the
//! message. The parser never reads past the body: a truncated response
//! yields the records decoded so far, the last one possibly partial.
use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    error::ProtocolError,
    query::AttributeType,
    result::{AttrValue, Match, MatchLayout, SchemaType, SearchResult, WordStats},
};

use super::{ResponseStatus, frame::FrameReader};

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResultParser {
    layout: MatchLayout,
}

impl SearchResultParser {
    pub fn new(layout: MatchLayout) -> Self {
        Self { layout }
    }

    /// Decodes up to `nreqs` records from `body`.
    pub fn parse(&self, body: &[u8], nreqs: usize) -> Vec<SearchResult> {
        let mut reader = FrameReader::new(body);
        let mut results = Vec::with_capacity(nreqs);

        while results.len() < nreqs && reader.has_remaining() {
            let mut result = SearchResult::default();
            let outcome = self.parse_record(&mut reader, &mut result);
            results.push(result);

            if let Err(e) = outcome {
                warn!("search response cut short in result {}: {e}", results.len() - 1);
                break;
            }
        }

        if results.len() < nreqs {
            warn!("expected {nreqs} search results, decoded {}", results.len());
        }
        results
    }

    fn parse_record(
        &self,
        reader: &mut FrameReader<'_>,
        result: &mut SearchResult,
    ) -> Result<(), ProtocolError> {
        result.status = reader.u32()?;
        if result.status != u32::from(ResponseStatus::Ok) {
            let message = reader.string()?;
            if result.status == u32::from(ResponseStatus::Warning) {
                result.warning = Some(message);
            } else {
                result.error = Some(message);
                return Ok(());
            }
        }

        let mut nfields = reader.u32()?;
        while nfields > 0 && reader.has_remaining() {
            result.fields.push(reader.string()?);
            nfields -= 1;
        }

        let mut nattrs = reader.u32()?;
        while nattrs > 0 && reader.has_remaining() {
            let name = reader.string()?;
            let attr_type = SchemaType::from_id(reader.u32()?);
            if let SchemaType::Unknown(raw) = attr_type {
                debug!("attribute '{name}' has unknown type {raw:#x}, reading as integer");
            }
            result.attrs.push((name, attr_type));
            nattrs -= 1;
        }

        let mut count = reader.u32()?;
        let id64 = reader.u32()? != 0;
        let mut positions: HashMap<u64, usize> = HashMap::new();

        while count > 0 && reader.has_remaining() {
            count -= 1;

            let id = if id64 {
                reader.u64()?
            } else {
                u64::from(reader.u32()?)
            };
            let weight = reader.u32()?;

            let mut attrs = Vec::with_capacity(result.attrs.len());
            for (name, attr_type) in &result.attrs {
                attrs.push((name.clone(), read_value(reader, attr_type.decoded_as())?));
            }

            let m = Match { id, weight, attrs };
            match self.layout {
                MatchLayout::List => result.matches.push(m),
                MatchLayout::ById => match positions.get(&id) {
                    Some(&at) => result.matches[at] = m,
                    None => {
                        positions.insert(id, result.matches.len());
                        result.matches.push(m);
                    }
                },
            }
        }

        result.total = reader.u32()?;
        result.total_found = reader.u32()?;
        result.time = f64::from(reader.u32()?) / 1000.0;

        let mut nwords = reader.u32()?;
        while nwords > 0 && reader.has_remaining() {
            let word = reader.string()?;
            let stats = WordStats {
                docs: reader.u32()?,
                hits: reader.u32()?,
            };
            match result.words.iter_mut().find(|(w, _)| *w == word) {
                Some(entry) => entry.1 = stats,
                None => result.words.push((word, stats)),
            }
            nwords -= 1;
        }

        Ok(())
    }
}

fn read_value(
    reader: &mut FrameReader<'_>,
    attr_type: AttributeType,
) -> Result<AttrValue, ProtocolError> {
    match attr_type {
        AttributeType::Bigint => return reader.i64().map(AttrValue::Bigint),
        AttributeType::Float => return reader.f32().map(AttrValue::Float),
        _ => {}
    }

    let value = reader.u32()?;
    Ok(match attr_type {
        AttributeType::Multi => {
            let mut values = Vec::new();
            let mut n = value;
            while n > 0 && reader.has_remaining() {
                values.push(reader.u32()?);
                n -= 1;
            }
            AttrValue::Multi(values)
        }
        AttributeType::Multi64 => {
            // the count is in 32-bit words, two per element
            let mut values = Vec::new();
            let mut n = i64::from(value);
            while n > 0 && reader.has_remaining() {
                values.push(reader.i64()?);
                n -= 2;
            }
            AttrValue::Multi64(values)
        }
        AttributeType::String => AttrValue::String(reader.bytes(value as usize)?.to_vec()),
        _ => AttrValue::Uint(value),
    })
}
