//! Per-request context
//!
//! The process serves exactly one request, so there is exactly one of
//! these: the confined root plus the decoded query parameters.

use crate::protocol::QueryParams;
use crate::storage::ConfinedRoot;

#[derive(Debug)]
pub struct RequestContext {
    pub root: ConfinedRoot,
    pub query: QueryParams,
}

impl RequestContext {
    pub fn new(root: ConfinedRoot, query: QueryParams) -> RequestContext {
        RequestContext { root, query }
    }
}
