//! Request options for each endpoint family.
//!
//! Every option maps to one query key. The paginated families also implement
//! [`PageOption`] so a `next` cursor can be replayed into the same variants.

use crate::query::{PageOption, ParamKind, ParamValue, QueryParams, RequestOption};

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Options for reading activities from any feed kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetActivitiesOption {
    Limit(i64),
    Offset(i64),
    IdGt(String),
    IdGte(String),
    IdLt(String),
    IdLte(String),
    /// Name of a ranking method configured on the feed group.
    Ranking(String),
    EnrichOwnReactions,
    EnrichRecentReactions,
    EnrichReactionCounts,
    EnrichOwnChildren,
    EnrichRecentReactionsLimit(i64),
    /// Only enrich reactions of these kinds.
    EnrichReactionKindsFilter(Vec<String>),
}

impl RequestOption for GetActivitiesOption {
    fn apply(&self, params: &mut QueryParams) {
        use GetActivitiesOption::*;
        match self {
            Limit(n) => params.set("limit", n.to_string()),
            Offset(n) => params.set("offset", n.to_string()),
            IdGt(id) => params.set_nonempty("id_gt", id.as_str()),
            IdGte(id) => params.set_nonempty("id_gte", id.as_str()),
            IdLt(id) => params.set_nonempty("id_lt", id.as_str()),
            IdLte(id) => params.set_nonempty("id_lte", id.as_str()),
            Ranking(r) => params.set_nonempty("ranking", r.as_str()),
            EnrichOwnReactions => params.set("withOwnReactions", "true"),
            EnrichRecentReactions => params.set("withRecentReactions", "true"),
            EnrichReactionCounts => params.set("withReactionCounts", "true"),
            EnrichOwnChildren => params.set("withOwnChildren", "true"),
            EnrichRecentReactionsLimit(n) => params.set("recentReactionsLimit", n.to_string()),
            EnrichReactionKindsFilter(kinds) => {
                params.set_nonempty("reactionKindsFilter", kinds.join(","))
            }
        }
    }
}

impl PageOption for GetActivitiesOption {
    const VOCABULARY: &'static [(&'static str, ParamKind)] = &[
        ("limit", ParamKind::Int),
        ("offset", ParamKind::Int),
        ("id_gt", ParamKind::Str),
        ("id_gte", ParamKind::Str),
        ("id_lt", ParamKind::Str),
        ("id_lte", ParamKind::Str),
        ("ranking", ParamKind::Str),
        ("withOwnReactions", ParamKind::Flag),
        ("withRecentReactions", ParamKind::Flag),
        ("withReactionCounts", ParamKind::Flag),
        ("withOwnChildren", ParamKind::Flag),
        ("recentReactionsLimit", ParamKind::Int),
        ("reactionKindsFilter", ParamKind::List),
    ];

    fn from_param(key: &str, value: ParamValue) -> Option<Self> {
        use GetActivitiesOption::*;
        let opt = match (key, value) {
            ("limit", ParamValue::Int(n)) => Limit(n),
            ("offset", ParamValue::Int(n)) => Offset(n),
            ("id_gt", ParamValue::Str(s)) => IdGt(s),
            ("id_gte", ParamValue::Str(s)) => IdGte(s),
            ("id_lt", ParamValue::Str(s)) => IdLt(s),
            ("id_lte", ParamValue::Str(s)) => IdLte(s),
            ("ranking", ParamValue::Str(s)) => Ranking(s),
            ("withOwnReactions", ParamValue::Flag) => EnrichOwnReactions,
            ("withRecentReactions", ParamValue::Flag) => EnrichRecentReactions,
            ("withReactionCounts", ParamValue::Flag) => EnrichReactionCounts,
            ("withOwnChildren", ParamValue::Flag) => EnrichOwnChildren,
            ("recentReactionsLimit", ParamValue::Int(n)) => EnrichRecentReactionsLimit(n),
            ("reactionKindsFilter", ParamValue::List(kinds)) => EnrichReactionKindsFilter(kinds),
            _ => return None,
        };
        Some(opt)
    }
}

// ---------------------------------------------------------------------------
// Reaction filters
// ---------------------------------------------------------------------------

/// Options for listing reactions by activity, user or parent reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReactionsOption {
    Limit(i64),
    IdGt(String),
    IdGte(String),
    IdLt(String),
    IdLte(String),
    /// Include the reacted-to activity in the response.
    ActivityData,
    OwnChildren,
}

impl RequestOption for FilterReactionsOption {
    fn apply(&self, params: &mut QueryParams) {
        use FilterReactionsOption::*;
        match self {
            Limit(n) => params.set("limit", n.to_string()),
            IdGt(id) => params.set_nonempty("id_gt", id.as_str()),
            IdGte(id) => params.set_nonempty("id_gte", id.as_str()),
            IdLt(id) => params.set_nonempty("id_lt", id.as_str()),
            IdLte(id) => params.set_nonempty("id_lte", id.as_str()),
            ActivityData => params.set("with_activity_data", "true"),
            OwnChildren => params.set("with_own_children", "true"),
        }
    }
}

impl PageOption for FilterReactionsOption {
    const VOCABULARY: &'static [(&'static str, ParamKind)] = &[
        ("limit", ParamKind::Int),
        ("id_gt", ParamKind::Str),
        ("id_gte", ParamKind::Str),
        ("id_lt", ParamKind::Str),
        ("id_lte", ParamKind::Str),
        ("with_activity_data", ParamKind::Flag),
        ("with_own_children", ParamKind::Flag),
    ];

    fn from_param(key: &str, value: ParamValue) -> Option<Self> {
        use FilterReactionsOption::*;
        let opt = match (key, value) {
            ("limit", ParamValue::Int(n)) => Limit(n),
            ("id_gt", ParamValue::Str(s)) => IdGt(s),
            ("id_gte", ParamValue::Str(s)) => IdGte(s),
            ("id_lt", ParamValue::Str(s)) => IdLt(s),
            ("id_lte", ParamValue::Str(s)) => IdLte(s),
            ("with_activity_data", ParamValue::Flag) => ActivityData,
            ("with_own_children", ParamValue::Flag) => OwnChildren,
            _ => return None,
        };
        Some(opt)
    }
}

// ---------------------------------------------------------------------------
// Follow lists
// ---------------------------------------------------------------------------

/// Options for listing followers or followed feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowListOption {
    Limit(i64),
    Offset(i64),
    /// Restrict the result to these feed IDs (`slug:user`).
    Filter(Vec<String>),
}

impl RequestOption for FollowListOption {
    fn apply(&self, params: &mut QueryParams) {
        match self {
            FollowListOption::Limit(n) => params.set("limit", n.to_string()),
            FollowListOption::Offset(n) => params.set("offset", n.to_string()),
            FollowListOption::Filter(feeds) => params.set_nonempty("filter", feeds.join(",")),
        }
    }
}
