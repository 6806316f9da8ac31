//! Fatal resolution errors.
//!
//! "No documentable content" is not an error: it is `Ok(None)` and callers
//! decide what to do with it. The variants here are the conditions under which
//! a declaration's documentation would be wrong or misleading, so resolution
//! of that declaration stops.

/// Which kind of class member failed to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Setter,
    Property,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberKind::Setter => f.write_str("setter"),
            MemberKind::Property => f.write_str("property"),
        }
    }
}

/// Where a declaration-less symbol was encountered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclarationSite {
    Parameter,
    Property,
}

impl std::fmt::Display for DeclarationSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationSite::Parameter => f.write_str("parameter"),
            DeclarationSite::Property => f.write_str("property"),
        }
    }
}

/// A fatal error for the declaration being resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// A class setter or property whose type resolved to nothing.
    UnresolvableMember { member: String, kind: MemberKind },
    /// A parameter or property without a declaration, resolved without an
    /// enclosing node to stand in for it.
    MissingDeclaration { name: String, site: DeclarationSite },
    /// A reference descriptor could not be given a file path.
    MissingReferenceLocation { text: String },
    /// The oracle reported a class type whose symbol has no class declaration.
    MissingClassDeclaration { name: String },
    /// The oracle reported an enum type whose symbol has no enum declaration.
    MissingEnumDeclaration { name: String },
    /// A caller passed a handle the oracle never issued.
    UnknownHandle { table: &'static str, index: u32 },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::UnresolvableMember { member, kind } => write!(
                f,
                "{kind} \"{member}\" could not be resolved; it was either filtered out or should be marked as internal"
            ),
            ResolveError::MissingDeclaration { name, site } => write!(
                f,
                "no {site} declaration found for \"{name}\"; an enclosing node is required to resolve it"
            ),
            ResolveError::MissingReferenceLocation { text } => {
                write!(f, "no file path found for reference \"{text}\"")
            }
            ResolveError::MissingClassDeclaration { name } => {
                write!(f, "no class declaration found for \"{name}\"")
            }
            ResolveError::MissingEnumDeclaration { name } => {
                write!(f, "no enum declaration found for \"{name}\"")
            }
            ResolveError::UnknownHandle { table, index } => {
                write!(f, "{table}[{index}] is not part of this program")
            }
        }
    }
}

impl std::error::Error for ResolveError {}
