//! Directive and role names Sphinx defines.
//!
//! Sphinx is not consulted at runtime; these tables list what a stock
//! installation registers so its markup can be treated as known.

/// Names registered by one Sphinx domain.
#[derive(Debug, Clone, Copy)]
pub struct Domain {
    /// Prefix used in qualified names, e.g. `py` in `py:func`
    pub name: &'static str,
    pub directives: &'static [&'static str],
    pub roles: &'static [&'static str],
}

/// The standard domain. Its names are only used unqualified.
pub const STD_DOMAIN: Domain = Domain {
    name: "std",
    directives: &["program", "cmdoption", "option", "envvar", "glossary", "productionlist"],
    roles: &[
        "option", "envvar", "token", "term", "ref", "numref", "keyword", "doc",
    ],
};

/// Language domains. Names are valid bare and as `<domain>:<name>`.
pub const LANGUAGE_DOMAINS: [Domain; 4] = [
    Domain {
        name: "c",
        directives: &[
            "member",
            "var",
            "function",
            "macro",
            "struct",
            "union",
            "enum",
            "enumerator",
            "type",
            "alias",
            "namespace",
            "namespace-push",
            "namespace-pop",
        ],
        roles: &[
            "member",
            "data",
            "var",
            "func",
            "macro",
            "struct",
            "union",
            "enum",
            "enumerator",
            "type",
            "expr",
            "texpr",
        ],
    },
    Domain {
        name: "cpp",
        directives: &[
            "class",
            "struct",
            "union",
            "function",
            "member",
            "var",
            "type",
            "concept",
            "enum",
            "enum-struct",
            "enum-class",
            "enumerator",
            "namespace",
            "namespace-push",
            "namespace-pop",
            "alias",
        ],
        roles: &[
            "any",
            "class",
            "struct",
            "union",
            "func",
            "member",
            "var",
            "type",
            "concept",
            "enum",
            "enumerator",
            "expr",
            "texpr",
        ],
    },
    Domain {
        name: "js",
        directives: &["function", "method", "class", "data", "attribute", "module"],
        roles: &["func", "meth", "class", "data", "attr", "mod"],
    },
    Domain {
        name: "py",
        directives: &[
            "function",
            "data",
            "class",
            "exception",
            "method",
            "classmethod",
            "staticmethod",
            "attribute",
            "property",
            "type",
            "module",
            "currentmodule",
            "decorator",
            "decoratormethod",
        ],
        roles: &[
            "data", "exc", "func", "deco", "class", "const", "attr", "type", "meth", "mod", "obj",
        ],
    },
];

/// Directives Sphinx registers straight into the docutils tables.
pub const GENERIC_DIRECTIVES: &[&str] = &[
    "toctree",
    "sectionauthor",
    "moduleauthor",
    "codeauthor",
    "seealso",
    "tabularcolumns",
    "centered",
    "acks",
    "hlist",
    "only",
    "include",
    "highlight",
    "code-block",
    "sourcecode",
    "literalinclude",
    "code",
    "index",
    "deprecated",
    "versionadded",
    "versionchanged",
    "versionremoved",
    "describe",
    "object",
    "default-domain",
    "math",
    "rubric",
];

/// Roles Sphinx registers straight into the docutils tables.
pub const GENERIC_ROLES: &[&str] = &[
    "abbr",
    "command",
    "dfn",
    "file",
    "guilabel",
    "kbd",
    "mailheader",
    "makevar",
    "manpage",
    "menuselection",
    "mimetype",
    "newsgroup",
    "program",
    "regexp",
    "samp",
    "pep",
    "rfc",
    "download",
    "index",
    "math",
    "eq",
    "any",
];

/// Names registered by one bundled `sphinx.ext` extension when listed in
/// `extensions`.
#[derive(Debug, Clone, Copy)]
pub struct Extension {
    pub module: &'static str,
    pub directives: &'static [&'static str],
    pub roles: &'static [&'static str],
}

pub const EXTENSIONS: &[Extension] = &[
    Extension {
        module: "sphinx.ext.autodoc",
        directives: &[
            "automodule",
            "autoclass",
            "autoexception",
            "autofunction",
            "autodecorator",
            "autodata",
            "automethod",
            "autoattribute",
            "autoproperty",
            "autotype",
        ],
        roles: &[],
    },
    Extension {
        module: "sphinx.ext.autosummary",
        directives: &["autosummary"],
        roles: &["autolink"],
    },
    Extension {
        module: "sphinx.ext.doctest",
        directives: &["testsetup", "testcleanup", "doctest", "testcode", "testoutput"],
        roles: &[],
    },
    Extension {
        module: "sphinx.ext.todo",
        directives: &["todo", "todolist"],
        roles: &[],
    },
    Extension {
        module: "sphinx.ext.graphviz",
        directives: &["graphviz", "graph", "digraph"],
        roles: &[],
    },
    Extension {
        module: "sphinx.ext.ifconfig",
        directives: &["ifconfig"],
        roles: &[],
    },
    Extension {
        module: "sphinx.ext.inheritance_diagram",
        directives: &["inheritance-diagram"],
        roles: &[],
    },
    Extension {
        module: "sphinx.ext.intersphinx",
        directives: &[],
        roles: &["external"],
    },
];

/// Table entry for a bundled extension module, if it registers any markup.
pub fn extension(module: &str) -> Option<&'static Extension> {
    EXTENSIONS.iter().find(|extension| extension.module == module)
}
