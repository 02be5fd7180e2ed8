//! Template AST and compiled template types.
//!
//! - `Expr`: what can appear inside `{{ }}` (paths, literals, calls)
//! - `Node`: a piece of the program (text, interpolation, conditional)
//! - `TemplateSource`: raw bytes read for a logical path plus their digest
//! - `CompiledTemplate`: the immutable, executable form of a source

use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `.` followed by zero or more field names; `.` alone is the context.
    Path(Vec<String>),
    Literal(Literal),
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Expr,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Interpolate(Expr),
    If {
        branches: Vec<Branch>,
        otherwise: Vec<Node>,
    },
}

/// Lowercase hex SHA-256 of the given bytes.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Raw template text as read for a logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub path: String,
    pub bytes: Vec<u8>,
    pub hash: String,
}

impl TemplateSource {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let hash = digest(&bytes);
        Self {
            path: path.into(),
            bytes,
            hash,
        }
    }
}

/// A parsed template. Never mutated after compilation; the engine shares it
/// behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    pub name: String,
    pub path: String,
    digest: String,
    program: Vec<Node>,
}

impl CompiledTemplate {
    pub(crate) fn new(name: String, path: String, digest: String, program: Vec<Node>) -> Self {
        Self {
            name,
            path,
            digest,
            program,
        }
    }

    /// SHA-256 of the source bytes this template was compiled from.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn program(&self) -> &[Node] {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn digest_is_sha256_hex() {
        let d = digest(b"");
        assert_eq!(
            d,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(digest(b"Hello, {{.Name}}!").len(), 64);
    }

    #[test]
    fn source_hash_matches_bytes() {
        let src = TemplateSource::new("a.jet", b"abc".to_vec());
        assert_eq!(src.hash, digest(b"abc"));
        assert_eq!(src.path, "a.jet");
    }

    proptest! {
        #[test]
        fn identical_bytes_identical_digest(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(digest(&bytes), digest(&bytes.clone()));
        }

        #[test]
        fn single_byte_change_changes_digest(
            bytes in proptest::collection::vec(any::<u8>(), 1..256),
            idx in any::<prop::sample::Index>(),
            delta in 1u8..=255,
        ) {
            let mut changed = bytes.clone();
            let i = idx.index(changed.len());
            changed[i] = changed[i].wrapping_add(delta);
            prop_assert_ne!(digest(&bytes), digest(&changed));
        }
    }

    #[test]
    fn expr_variants() {
        let call = Expr::Call {
            name: "formatCurrency".into(),
            args: vec![Expr::Path(vec!["Balance".into()])],
        };
        assert!(matches!(call, Expr::Call { ref args, .. } if args.len() == 1));
        assert_eq!(Expr::Path(vec![]), Expr::Path(vec![]));
        assert_ne!(
            Expr::Literal(Literal::Int(1)),
            Expr::Literal(Literal::Float(1.0))
        );
    }
}
