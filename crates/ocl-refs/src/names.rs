//! Reference name validation.
//!
//! Every operation rejects the empty string and accepts any other name, so
//! that readers and writers agree on what a reference is and entries written
//! by less strict tools can be resolved, retagged and removed.
//!
//! [`validate_new_ref_name`] checks the stricter `ref.name` grammar of the
//! image layout specification. Front ends use it to warn about names other
//! tools may refuse:
//!
//! ```text
//! ref       ::= component ("/" component)*
//! component ::= alphanum (separator alphanum)*
//! alphanum  ::= [A-Za-z0-9]+
//! separator ::= [-._:@+] | "--"
//! ```

use crate::error::{RefError, Result};

/// Single-character separators allowed between alphanumeric runs.
const SEPARATORS: &[u8] = b"-._:@+";

/// Reject the empty reference name.
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RefError::EmptyRefName);
    }
    Ok(())
}

/// Check a reference name against the `ref.name` grammar.
///
/// # Examples
///
/// ```
/// use ocl_refs::names::validate_new_ref_name;
///
/// assert!(validate_new_ref_name("latest").is_ok());
/// assert!(validate_new_ref_name("v1.2.3").is_ok());
/// assert!(validate_new_ref_name("library/alpine:3.19").is_ok());
/// assert!(validate_new_ref_name("").is_err());
/// assert!(validate_new_ref_name("-dash").is_err());
/// ```
pub fn validate_new_ref_name(name: &str) -> Result<()> {
    validate_ref_name(name)?;

    for component in name.split('/') {
        check_component(component).map_err(|reason| RefError::InvalidRefName {
            name: name.to_string(),
            reason,
        })?;
    }

    Ok(())
}

fn check_component(component: &str) -> std::result::Result<(), String> {
    let bytes = component.as_bytes();
    if bytes.is_empty() {
        return Err("path components must not be empty".into());
    }

    let mut i = 0;
    loop {
        let run_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
        if i == run_start {
            return Err(if run_start == 0 {
                format!("component must start with an alphanumeric character: {component:?}")
            } else {
                format!("separator must be followed by an alphanumeric character: {component:?}")
            });
        }
        if i == bytes.len() {
            return Ok(());
        }

        if bytes[i] == b'-' && bytes.get(i + 1) == Some(&b'-') {
            i += 2;
        } else if SEPARATORS.contains(&bytes[i]) {
            i += 1;
        } else {
            // Report the full character, not a UTF-8 fragment.
            let ch = component[i..].chars().next().unwrap_or_default();
            return Err(format!("contains forbidden character: {ch:?}"));
        }
    }
}
