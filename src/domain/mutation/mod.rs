//! Mutation module - bulk find-and-replace over instance rows.

mod find_replace;

pub use find_replace::{
    replace_all, ReplaceError, ReplaceField, ReplaceOutcome, ReplaceRule, ReplaceRules,
};
