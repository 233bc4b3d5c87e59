use tracing::debug;

use super::conf::SphinxConfig;
use super::domains::{self, GENERIC_DIRECTIVES, GENERIC_ROLES, LANGUAGE_DOMAINS, STD_DOMAIN};
use super::install_guard;
use crate::error::Result;

/// Every directive and role name Sphinx would make known for a project
/// configured by `config`.
///
/// Order: standard domain, then each language domain's bare names followed
/// by its qualified names, then the generic registrations, then the names
/// contributed by configured extensions and `extlinks`. Duplicates are kept.
pub fn get_sphinx_directives_and_roles(config: &SphinxConfig) -> Result<(Vec<String>, Vec<String>)> {
    install_guard()?;

    let mut directives: Vec<String> = STD_DOMAIN.directives.iter().map(|s| s.to_string()).collect();
    let mut roles: Vec<String> = STD_DOMAIN.roles.iter().map(|s| s.to_string()).collect();

    for domain in LANGUAGE_DOMAINS {
        directives.extend(domain.directives.iter().map(|s| s.to_string()));
        directives.extend(domain.directives.iter().map(|s| format!("{}:{}", domain.name, s)));
        roles.extend(domain.roles.iter().map(|s| s.to_string()));
        roles.extend(domain.roles.iter().map(|s| format!("{}:{}", domain.name, s)));
    }

    directives.extend(GENERIC_DIRECTIVES.iter().map(|s| s.to_string()));
    roles.extend(GENERIC_ROLES.iter().map(|s| s.to_string()));

    for module in &config.extensions {
        match domains::extension(module) {
            Some(extension) => {
                directives.extend(extension.directives.iter().map(|s| s.to_string()));
                roles.extend(extension.roles.iter().map(|s| s.to_string()));
            }
            None => debug!("No known markup for extension '{}'", module),
        }
    }
    roles.extend(config.extlinks.iter().cloned());

    debug!(
        directives = directives.len(),
        roles = roles.len(),
        "Collected Sphinx directives and roles"
    );
    Ok((directives, roles))
}
