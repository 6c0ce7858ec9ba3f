// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Community rules: the memo payload model, the memory tier and the
//! tiered resolver.

pub mod cache;
pub mod resolver;
pub mod types;

pub use cache::RulesCache;
pub use resolver::RulesResolver;
pub use types::{CommunityRules, MemoPayload, COMMUNITY_RULES_TYPE};
