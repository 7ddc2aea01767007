/// Condition Builder Module
///
/// Helpers that compose WHERE-clause fragments. Values are inlined through
/// [`quote`](crate::core::db::sanitize::quote); conditions passed to
/// [`add_condition`] are taken as finished SQL.

use crate::core::db::sanitize::quote_sequence;
use rusqlite::types::Value;

/// Always-false fragment used when a required value list is empty
pub const MATCH_NONE: &str = "1=0";
/// Always-true fragment used when an optional value list is empty
pub const MATCH_ALL: &str = "1=1";

/// Appends conditions to an existing WHERE clause.
///
/// Produces ` AND ( c1 )\nAND ( c2 )` for the given conditions, or an empty
/// string when there are none. Blank conditions are skipped. A single
/// optional condition can be passed as an `Option<&str>`.
///
/// ```
/// use clitools::core::db::add_condition;
///
/// assert_eq!(add_condition(["a = 1", "b = 2"]), " AND ( a = 1 )\nAND ( b = 2 )");
/// assert_eq!(add_condition(None::<&str>), "");
/// ```
pub fn add_condition<I, S>(conditions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = conditions
        .into_iter()
        .filter(|c| !c.as_ref().trim().is_empty())
        .map(|c| format!("AND ( {} )", c.as_ref()))
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!(" {}", parts.join("\n"))
    }
}

/// Builds `field IN (v1,v2,...)` with every value quoted.
///
/// An empty list yields [`MATCH_NONE`] when `required` is set (an empty
/// allow-list excludes everything) and [`MATCH_ALL`] otherwise.
pub fn condition_in<I, V>(field: &str, values: I, required: bool) -> String
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    membership(field, "IN", values, required)
}

/// Builds `field NOT IN (v1,v2,...)`. Empty lists behave as in
/// [`condition_in`].
pub fn condition_not_in<I, V>(field: &str, values: I, required: bool) -> String
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    membership(field, "NOT IN", values, required)
}

fn membership<I, V>(field: &str, operator: &str, values: I, required: bool) -> String
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let quoted = quote_sequence(values);
    if quoted.is_empty() {
        let fragment = if required { MATCH_NONE } else { MATCH_ALL };
        return fragment.to_string();
    }
    format!("{} {} ({})", field, operator, quoted.join(","))
}
