//! Sphinx awareness: knowing which markup Sphinx adds so that it is not
//! reported as unknown.

pub mod catalog;
pub mod conf;
pub mod confdir;
pub mod domains;
pub mod substitutions;
pub mod whitelist;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::ignore::ignore_directives_and_roles;
use crate::rst::Registry;

pub use catalog::get_sphinx_directives_and_roles;
pub use conf::SphinxConfig;
pub use confdir::find_sphinx_confdir;
pub use substitutions::{extract, register_substitutions, SubstitutionMap, SubstitutionResolver, TargetMap};
pub use whitelist::filter_whitelisted_directives_and_roles;

/// Whether Sphinx support is compiled in.
pub const SPHINX_INSTALLED: bool = cfg!(feature = "sphinx");

pub(crate) fn install_guard() -> Result<()> {
    if SPHINX_INSTALLED {
        Ok(())
    } else {
        Err(Error::FeatureUnavailable { feature: "sphinx" })
    }
}

/// The Sphinx project a document belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SphinxApp {
    /// Directory holding `conf.py`, if one was found
    pub confdir: Option<PathBuf>,
    pub config: SphinxConfig,
}

impl SphinxApp {
    pub fn new(confdir: Option<PathBuf>) -> Self {
        let config = confdir.as_deref().map(SphinxConfig::load).unwrap_or_default();
        Self { confdir, config }
    }

    /// Substitutions and link targets from the prolog, epilog and
    /// `html_context`. Empty when there is no `conf.py`.
    pub fn substitutions_and_targets(&self) -> (SubstitutionMap, TargetMap) {
        if self.confdir.is_none() {
            return Default::default();
        }
        extract(&self.config.prolog_text(), self.config.context_substitutions())
    }
}

/// Locate the Sphinx project for a document in `source_dir`.
///
/// Returns `None` when Sphinx support is not compiled in. A document outside
/// any Sphinx project still gets an app, with no `conf.py`, since the stock
/// Sphinx markup applies regardless.
pub fn load_sphinx_if_available(source_dir: Option<&Path>) -> Option<SphinxApp> {
    if !SPHINX_INSTALLED {
        debug!("Sphinx support not compiled in");
        return None;
    }
    let confdir = source_dir.and_then(find_sphinx_confdir);
    Some(SphinxApp::new(confdir))
}

/// Register every non-whitelisted Sphinx directive and role as ignored.
pub fn load_sphinx_ignores(registry: &mut Registry, app: &SphinxApp) -> Result<()> {
    let (directives, roles) = get_sphinx_directives_and_roles(&app.config)?;
    let (directives, roles) = filter_whitelisted_directives_and_roles(directives, roles);
    ignore_directives_and_roles(registry, &directives, &roles);
    Ok(())
}
