use log::debug;

use crate::query::{AttributeOverride, Filter, OverrideValues, QueryRequest};

use super::frame::FrameWriter;

/// Serializes one query into its positional SEARCH body.
pub fn encode_query(request: &QueryRequest) -> Vec<u8> {
    let mut w = FrameWriter::with_capacity(256 + request.query.len());

    w.put_u32(request.offset)
        .put_u32(request.limit)
        .put_u32(request.match_mode.id())
        .put_u32(request.ranker.id());
    if request.ranker.takes_expression() {
        w.put_str(&request.rank_expr);
    }
    w.put_u32(request.sort_mode.id())
        .put_str(&request.sort_by)
        .put_str(&request.query);

    w.put_u32(request.weights.len() as u32);
    for weight in &request.weights {
        w.put_u32(*weight);
    }

    w.put_str(&request.index);
    // id range marker: 64-bit bounds follow
    w.put_u32(1).put_u64(request.min_id).put_u64(request.max_id);

    w.put_u32(request.filters.len() as u32);
    for filter in &request.filters {
        put_filter(&mut w, filter);
    }

    w.put_u32(request.group_func.id())
        .put_str(&request.group_by)
        .put_u32(request.max_matches)
        .put_str(&request.group_sort)
        .put_u32(request.cutoff)
        .put_u32(request.retry_count)
        .put_u32(request.retry_delay)
        .put_str(&request.group_distinct);

    match &request.anchor {
        None => {
            w.put_u32(0);
        }
        Some(anchor) => {
            w.put_u32(1)
                .put_str(&anchor.lat_attr)
                .put_str(&anchor.long_attr)
                .put_f32(anchor.lat)
                .put_f32(anchor.long);
        }
    }

    w.put_u32(request.index_weights.len() as u32);
    for (index, weight) in &request.index_weights {
        w.put_str(index).put_u32(*weight);
    }

    w.put_u32(request.max_query_time);

    w.put_u32(request.field_weights.len() as u32);
    for (field, weight) in &request.field_weights {
        w.put_str(field).put_u32(*weight);
    }

    w.put_str(&request.comment);

    w.put_u32(request.overrides.len() as u32);
    for o in &request.overrides {
        put_override(&mut w, o);
    }

    w.put_str(&request.select);

    debug!("encoded query '{}' ({} bytes)", request.query, w.len());
    w.into_vec()
}

fn put_filter(w: &mut FrameWriter, filter: &Filter) {
    w.put_str(filter.attribute()).put_u32(filter.type_id());

    match filter {
        Filter::Values { values, .. } => {
            w.put_u32(values.len() as u32);
            for v in values {
                w.put_i64(*v);
            }
        }
        Filter::Range { min, max, .. } => {
            w.put_i64(*min).put_i64(*max);
        }
        Filter::FloatRange { min, max, .. } => {
            w.put_f32(*min).put_f32(*max);
        }
    }

    w.put_bool(filter.exclude());
}

fn put_override(w: &mut FrameWriter, o: &AttributeOverride) {
    w.put_str(&o.attribute)
        .put_u32(o.attr_type().id())
        .put_u32(o.len() as u32);

    match &o.values {
        OverrideValues::Integer(values) | OverrideValues::Timestamp(values) => {
            for (id, v) in values {
                w.put_u64(*id).put_u32(*v);
            }
        }
        OverrideValues::Bool(values) => {
            for (id, v) in values {
                w.put_u64(*id).put_bool(*v);
            }
        }
        OverrideValues::Float(values) => {
            for (id, v) in values {
                w.put_u64(*id).put_f32(*v);
            }
        }
        OverrideValues::Bigint(values) => {
            for (id, v) in values {
                w.put_u64(*id).put_i64(*v);
            }
        }
    }
}

/// Wraps already encoded query bodies into one batched SEARCH body:
/// `u32 0, u32 nreqs`, then the bodies back to back.
pub fn encode_batch<B: AsRef<[u8]>>(queries: &[B]) -> Vec<u8> {
    let size = queries.iter().map(|q| q.as_ref().len()).sum::<usize>();
    let mut w = FrameWriter::with_capacity(8 + size);

    w.put_u32(0).put_u32(queries.len() as u32);
    for query in queries {
        w.put_slice(query.as_ref());
    }
    w.into_vec()
}
