//! One document check's worth of parser state.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::code_block::register_code_directives;
use crate::config::{Settings, SphinxMode};
use crate::error::Result;
use crate::ignore::ignore_directives_and_roles;
use crate::rst::{Document, Parser, Registry};
use crate::sphinx::{self, register_substitutions, SubstitutionMap, TargetMap};

/// Owns the directive and role tables used to parse a document, together
/// with the substitutions and targets Sphinx makes available to it.
///
/// A session is prepared for one document and [`reset`](Self::reset) before
/// being prepared for another. Separate sessions share nothing, so documents
/// can be checked in parallel with one session each.
#[derive(Debug, Default)]
pub struct Session {
    registry: Registry,
    substitutions: SubstitutionMap,
    targets: TargetMap,
    source_dir: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the tables for a document living in `source_dir`.
    ///
    /// Sphinx markup is ignored when Sphinx support is available (and
    /// required, if `settings.sphinx` says so), code directives get
    /// [`CodeBlockDirective`](crate::code_block::CodeBlockDirective), Sphinx
    /// substitutions get resolvers, and the user's ignore lists are applied
    /// last.
    pub fn prepare(&mut self, source_dir: Option<&Path>, settings: &Settings) -> Result<()> {
        self.source_dir = source_dir.map(Path::to_path_buf);

        let app = match settings.sphinx {
            SphinxMode::Off => None,
            SphinxMode::Require => {
                sphinx::install_guard()?;
                sphinx::load_sphinx_if_available(source_dir)
            }
            SphinxMode::Auto => sphinx::load_sphinx_if_available(source_dir),
        };

        if let Some(app) = &app {
            if let Some(confdir) = &app.confdir {
                info!("Using Sphinx configuration in {}", confdir.display());
            }
            sphinx::load_sphinx_ignores(&mut self.registry, app)?;
            let (substitutions, targets) = app.substitutions_and_targets();
            self.substitutions = substitutions;
            self.targets = targets;
        }

        register_code_directives(&mut self.registry, &settings.ignore_directives);
        ignore_directives_and_roles(
            &mut self.registry,
            &settings.ignore_directives,
            &settings.ignore_roles,
        );

        // ignored substitutions resolve to their own reference text
        for name in &settings.ignore_substitutions {
            self.substitutions
                .entry(name.clone())
                .or_insert_with(|| format!("|{name}|"));
        }
        register_substitutions(&mut self.registry, &self.substitutions);

        debug!(registry = ?self.registry, "Session prepared");
        Ok(())
    }

    /// Parse `source` against the prepared tables.
    pub fn parse(&self, source: &str) -> Document {
        let mut parser = Parser::new(&self.registry).with_known_targets(self.targets.keys());
        if let Some(dir) = &self.source_dir {
            parser = parser.with_source_dir(dir);
        }
        parser.parse(source)
    }

    /// Back to pristine tables with no substitutions or targets.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.substitutions.clear();
        self.targets.clear();
        self.source_dir = None;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn substitutions(&self) -> &SubstitutionMap {
        &self.substitutions
    }

    pub fn targets(&self) -> &TargetMap {
        &self.targets
    }
}
