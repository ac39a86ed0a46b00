//! Naming rules for derived commands
//!
//! An accessor `getFoo` or `isFoo` has the short name `Foo` and yields the
//! family `assertFoo`, `assertNotFoo`, `verifyFoo`, `verifyNotFoo`. Short
//! names ending in `Present` negate in the middle instead:
//! `TextPresent` becomes `TextNotPresent`.

const ACCESSOR_PREFIXES: [&str; 2] = ["get", "is"];
const PRESENT_SUFFIX: &str = "Present";

/// Short name of an accessor-style method, `None` for anything else
pub fn short_name(method: &str) -> Option<&str> {
    ACCESSOR_PREFIXES
        .iter()
        .find_map(|prefix| method.strip_prefix(prefix))
}

/// Negated form of a short name
pub fn negate(short_name: &str) -> String {
    match short_name.strip_suffix(PRESENT_SUFFIX) {
        Some(stem) => format!("{stem}Not{PRESENT_SUFFIX}"),
        None => format!("Not{short_name}"),
    }
}

pub fn assert_name(short_name: &str) -> String {
    format!("assert{short_name}")
}

pub fn verify_name(short_name: &str) -> String {
    format!("verify{short_name}")
}

/// Name of the compound command that waits for the page after `method`
pub fn and_wait_name(method: &str) -> String {
    format!("{method}AndWait")
}
