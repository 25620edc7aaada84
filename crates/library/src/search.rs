use common::MediaType;
use query::Query;

use crate::index::{Media, MediaId, MediaIndex};

/// First record in index order accepted by `query`.
pub fn find_first<'a>(
    index: &'a MediaIndex,
    query: &Query,
    filter: Option<MediaType>,
) -> Option<&'a Media> {
    if query.is_empty() {
        return None;
    }
    index
        .iter(filter)
        .find(|media| query.accepts(media.search_strings(), media.genre()))
}

/// Every accepted record, each once, in index order.
pub fn find_all<'a>(index: &'a MediaIndex, query: &Query, filter: Option<MediaType>) -> Vec<&'a Media> {
    if query.is_empty() {
        return Vec::new();
    }
    index
        .iter(filter)
        .filter(|media| query.accepts(media.search_strings(), media.genre()))
        .collect()
}

pub fn find_all_ids(index: &MediaIndex, query: &Query, filter: Option<MediaType>) -> Vec<MediaId> {
    find_all(index, query, filter)
        .into_iter()
        .map(|media| media.id())
        .collect()
}
