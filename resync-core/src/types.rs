//! Domain types shared by the loader, the reconciler and the renderer.
//!
//! [`TypeExpr`] is the closed model of a parameter/result type. Everything
//! the reconciler compares or translates flows through it. Only inline
//! struct and interface literals are kept as [`TypeExpr::Verbatim`] text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------------

/// Go's predeclared type names. These are never namespace-qualified.
const BASIC_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Returns `true` for predeclared type names such as `string` or `error`.
pub fn is_basic_type(name: &str) -> bool {
    BASIC_TYPES.contains(&name)
}

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A parameter or result type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Basic(String),
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Channel(ChanDir, Box<TypeExpr>),
    /// `[len]T`. The length expression is kept as written.
    Array(String, Box<TypeExpr>),
    /// `...T`, only valid as the last parameter.
    Variadic(Box<TypeExpr>),
    /// `func(params) results`
    Func(MethodSignature),
    /// `Base[A, B]`
    Generic(Box<TypeExpr>, Vec<TypeExpr>),
    /// A declared type, optionally qualified by a package name.
    Named {
        namespace: Option<String>,
        name: String,
    },
    EmptyInterface,
    /// Inline `struct{...}` or non-empty `interface{...}` literal, kept as
    /// normalized text and compared by it.
    Verbatim(String),
}

impl TypeExpr {
    pub fn basic(name: impl Into<String>) -> Self {
        TypeExpr::Basic(name.into())
    }

    pub fn local(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(inner: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(inner))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map(Box::new(key), Box::new(value))
    }

    pub fn channel(dir: ChanDir, inner: TypeExpr) -> Self {
        TypeExpr::Channel(dir, Box::new(inner))
    }

    pub fn array(len: impl Into<String>, inner: TypeExpr) -> Self {
        TypeExpr::Array(len.into(), Box::new(inner))
    }

    pub fn variadic(inner: TypeExpr) -> Self {
        TypeExpr::Variadic(Box::new(inner))
    }

    pub fn generic(base: TypeExpr, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Generic(Box::new(base), args)
    }

    /// `true` for the predeclared `error` type.
    pub fn is_error(&self) -> bool {
        matches!(self, TypeExpr::Basic(name) if name == "error")
    }

    /// Rebuild the expression with every unqualified named type moved into
    /// `namespace`. Basic types and already-qualified names are kept as-is.
    pub fn qualify(&self, namespace: &str) -> TypeExpr {
        self.map_named(&|ns, name| match ns {
            None => TypeExpr::qualified(namespace, name),
            Some(ns) => TypeExpr::qualified(ns, name),
        })
    }

    /// Apply `f` to every `Named` node, rebuilding the surrounding structure.
    pub fn map_named(&self, f: &dyn Fn(Option<&str>, &str) -> TypeExpr) -> TypeExpr {
        match self {
            TypeExpr::Basic(_) | TypeExpr::EmptyInterface | TypeExpr::Verbatim(_) => self.clone(),
            TypeExpr::Pointer(inner) => TypeExpr::pointer(inner.map_named(f)),
            TypeExpr::Slice(inner) => TypeExpr::slice(inner.map_named(f)),
            TypeExpr::Map(key, value) => TypeExpr::map(key.map_named(f), value.map_named(f)),
            TypeExpr::Channel(dir, inner) => TypeExpr::channel(*dir, inner.map_named(f)),
            TypeExpr::Array(len, inner) => TypeExpr::array(len.clone(), inner.map_named(f)),
            TypeExpr::Variadic(inner) => TypeExpr::variadic(inner.map_named(f)),
            TypeExpr::Func(sig) => TypeExpr::Func(sig.map_types(&|ty| ty.map_named(f))),
            TypeExpr::Generic(base, args) => TypeExpr::generic(
                base.map_named(f),
                args.iter().map(|arg| arg.map_named(f)).collect(),
            ),
            TypeExpr::Named { namespace, name } => f(namespace.as_deref(), name),
        }
    }

    /// Drop parameter and result names inside function types. Go's type
    /// identity ignores them.
    pub fn erase_param_names(&self) -> TypeExpr {
        match self {
            TypeExpr::Basic(_)
            | TypeExpr::EmptyInterface
            | TypeExpr::Verbatim(_)
            | TypeExpr::Named { .. } => self.clone(),
            TypeExpr::Pointer(inner) => TypeExpr::pointer(inner.erase_param_names()),
            TypeExpr::Slice(inner) => TypeExpr::slice(inner.erase_param_names()),
            TypeExpr::Map(key, value) => {
                TypeExpr::map(key.erase_param_names(), value.erase_param_names())
            }
            TypeExpr::Channel(dir, inner) => TypeExpr::channel(*dir, inner.erase_param_names()),
            TypeExpr::Array(len, inner) => TypeExpr::array(len.clone(), inner.erase_param_names()),
            TypeExpr::Variadic(inner) => TypeExpr::variadic(inner.erase_param_names()),
            TypeExpr::Func(sig) => {
                let unnamed = |list: &[Param]| {
                    list.iter()
                        .map(|p| Param::unnamed(p.ty.erase_param_names()))
                        .collect()
                };
                TypeExpr::Func(MethodSignature::new(unnamed(&sig.params), unnamed(&sig.results)))
            }
            TypeExpr::Generic(base, args) => TypeExpr::generic(
                base.erase_param_names(),
                args.iter().map(TypeExpr::erase_param_names).collect(),
            ),
        }
    }

    /// Collect every package qualifier referenced by this expression.
    pub fn collect_namespaces(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeExpr::Basic(_) | TypeExpr::EmptyInterface | TypeExpr::Verbatim(_) => {}
            TypeExpr::Pointer(inner)
            | TypeExpr::Slice(inner)
            | TypeExpr::Channel(_, inner)
            | TypeExpr::Array(_, inner)
            | TypeExpr::Variadic(inner) => inner.collect_namespaces(out),
            TypeExpr::Map(key, value) => {
                key.collect_namespaces(out);
                value.collect_namespaces(out);
            }
            TypeExpr::Func(sig) => out.extend(sig.namespaces()),
            TypeExpr::Generic(base, args) => {
                base.collect_namespaces(out);
                for arg in args {
                    arg.collect_namespaces(out);
                }
            }
            TypeExpr::Named { namespace, .. } => {
                if let Some(ns) = namespace {
                    out.insert(ns.clone());
                }
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Basic(name) => f.write_str(name),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(inner) => write!(f, "[]{inner}"),
            TypeExpr::Map(key, value) => write!(f, "map[{key}]{value}"),
            TypeExpr::Channel(ChanDir::Both, inner) => write!(f, "chan {inner}"),
            TypeExpr::Channel(ChanDir::Send, inner) => write!(f, "chan<- {inner}"),
            TypeExpr::Channel(ChanDir::Recv, inner) => write!(f, "<-chan {inner}"),
            TypeExpr::Array(len, inner) => write!(f, "[{len}]{inner}"),
            TypeExpr::Variadic(inner) => write!(f, "...{inner}"),
            TypeExpr::Func(sig) => write!(f, "func{}", sig.render()),
            TypeExpr::Generic(base, args) => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{base}[{}]", args.join(", "))
            }
            TypeExpr::Named {
                namespace: Some(ns),
                name,
            } => write!(f, "{ns}.{name}"),
            TypeExpr::Named {
                namespace: None,
                name,
            } => f.write_str(name),
            TypeExpr::EmptyInterface => f.write_str("interface{}"),
            TypeExpr::Verbatim(text) => f.write_str(text),
        }
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// One `(name, type)` pair of a parameter or result list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

impl Param {
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Param {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Param { name: None, ty }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} {}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// Ordered parameter and result lists of a method.
///
/// A missing result list and an empty one are the same value here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodSignature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

impl MethodSignature {
    pub fn new(params: Vec<Param>, results: Vec<Param>) -> Self {
        MethodSignature { params, results }
    }

    /// Move every unqualified named type into `namespace`.
    pub fn qualify(&self, namespace: &str) -> MethodSignature {
        self.map_types(&|ty| ty.qualify(namespace))
    }

    /// Rebuild both lists with `f` applied to every type, keeping names.
    pub fn map_types(&self, f: &dyn Fn(&TypeExpr) -> TypeExpr) -> MethodSignature {
        let map_all = |list: &[Param]| {
            list.iter()
                .map(|p| Param {
                    name: p.name.clone(),
                    ty: f(&p.ty),
                })
                .collect()
        };
        MethodSignature {
            params: map_all(&self.params),
            results: map_all(&self.results),
        }
    }

    /// Every package qualifier the signature refers to.
    pub fn namespaces(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for p in self.params.iter().chain(self.results.iter()) {
            p.ty.collect_namespaces(&mut out);
        }
        out
    }

    /// Go source for the signature, starting at the parameter list:
    /// `(ctx context.Context) (*gql.Todo, error)`.
    pub fn render(&self) -> String {
        let params = join_params(&self.params);
        match self.results.as_slice() {
            [] => format!("({params})"),
            [single] if single.name.is_none() => format!("({params}) {}", single.ty),
            results => format!("({params}) ({})", join_params(results)),
        }
    }
}

fn join_params(list: &[Param]) -> String {
    list.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Contracts and implementation units
// ---------------------------------------------------------------------------

/// A method required by a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMethod {
    pub name: String,
    pub signature: MethodSignature,
}

/// A named interface from the contract module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub name: String,
    /// Methods in declaration order.
    pub methods: Vec<ContractMethod>,
    /// Embedded interfaces and type-set terms; not reconciled.
    pub embeds: Vec<String>,
    /// File declaring the interface.
    pub file: PathBuf,
    /// Import table of the declaring file, keyed by package name.
    pub imports: BTreeMap<String, String>,
}

/// An implemented method as seen by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplMethod {
    pub signature: MethodSignature,
    pub file: PathBuf,
}

/// A receiver type and the methods currently implemented on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationUnit {
    pub receiver: String,
    /// File declaring the receiver type, if the type exists.
    pub file: Option<PathBuf>,
    pub methods: BTreeMap<String, ImplMethod>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
