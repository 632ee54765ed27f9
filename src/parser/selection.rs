use crate::error::{Result, XgExtractError};
use crate::parser::model::HostGroup;

/// Resolves user-supplied selection terms against the extracted group
/// names. Each term matches by exact name first, then case-insensitive
/// exact name, then unique case-insensitive substring. Any term that
/// matches nothing, or a substring that matches more than one group,
/// aborts the run with every offending term listed.
///
/// Returns the selected group names in inventory order. An empty
/// selection selects every group.
pub fn resolve_selection(terms: &[String], groups: &[HostGroup]) -> Result<Vec<String>> {
    if terms.is_empty() {
        return Ok(groups.iter().map(|g| g.name.clone()).collect());
    }

    let mut selected: Vec<String> = Vec::new();
    let mut invalid: Vec<String> = Vec::new();

    for term in terms {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }

        match resolve_term(term, groups) {
            Ok(name) => {
                if !selected.contains(&name) {
                    selected.push(name);
                }
            }
            Err(reason) => invalid.push(reason),
        }
    }

    if !invalid.is_empty() {
        return Err(XgExtractError::InvalidSelection {
            terms: invalid.join("; "),
        });
    }

    // Keep inventory order regardless of the order terms were given in.
    let mut ordered: Vec<String> = Vec::new();
    for group in groups {
        if selected.contains(&group.name) && !ordered.contains(&group.name) {
            ordered.push(group.name.clone());
        }
    }

    Ok(ordered)
}

fn resolve_term(term: &str, groups: &[HostGroup]) -> std::result::Result<String, String> {
    if let Some(group) = groups.iter().find(|g| g.name == term) {
        return Ok(group.name.clone());
    }

    let term_lower = term.to_lowercase();
    if let Some(group) = groups.iter().find(|g| g.name.to_lowercase() == term_lower) {
        return Ok(group.name.clone());
    }

    let matches: Vec<&str> = groups
        .iter()
        .filter(|g| g.name.to_lowercase().contains(&term_lower))
        .map(|g| g.name.as_str())
        .collect();

    match matches.as_slice() {
        [single] => Ok((*single).to_string()),
        [] => Err(format!("'{}' matches no group", term)),
        many => Err(format!("'{}' is ambiguous ({})", term, many.join(", "))),
    }
}
