/// Directives that keep their real handlers even under Sphinx.
pub const DIRECTIVE_WHITELIST: [&str; 4] = ["code", "code-block", "sourcecode", "include"];

/// Roles that keep their real handlers even under Sphinx.
pub const ROLE_WHITELIST: [&str; 0] = [];

/// Drop whitelisted names, keeping the rest in order.
pub fn filter_whitelisted_directives_and_roles(
    directives: Vec<String>,
    roles: Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let directives = directives
        .into_iter()
        .filter(|name| !DIRECTIVE_WHITELIST.contains(&name.as_str()))
        .collect();
    let roles = roles
        .into_iter()
        .filter(|name| !ROLE_WHITELIST.contains(&name.as_str()))
        .collect();
    (directives, roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_whitelisted_directives_removed_in_order() {
        let (directives, roles) = filter_whitelisted_directives_and_roles(
            strings(&["toctree", "code", "include", "note", "code-block", "sourcecode", "only"]),
            strings(&["doc", "code"]),
        );

        assert_eq!(directives, strings(&["toctree", "note", "only"]));
        assert_eq!(roles, strings(&["doc", "code"]));
    }

    #[test]
    fn test_only_exact_matches_removed() {
        let (directives, _) =
            filter_whitelisted_directives_and_roles(strings(&["Code", "py:code", "code"]), vec![]);

        assert_eq!(directives, strings(&["Code", "py:code"]));
    }
}
