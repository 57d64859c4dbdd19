//! Markdown dialect translation from Turtl to Joplin.
//!
//! Turtl's editor writes bold as `__text__` and horizontal rules as any run
//! of hyphens; Joplin's renderer expects `**text**` and `* * *`.

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}").expect("valid regex"));

/// Rewrite a Turtl note body into Joplin's markdown dialect.
///
/// # Examples
///
/// ```
/// use t2j_core::markdown::translate;
///
/// assert_eq!(translate("a__b__c"), "a**b**c");
/// assert_eq!(translate("-----"), "* * *");
/// ```
pub fn translate(text: &str) -> String {
    let bold = text.replace("__", "**");
    HYPHEN_RUN.replace_all(&bold, "* * *").into_owned()
}
