//! resync core library: type model, Go declaration syntax, source model,
//! configuration and errors.
//!
//! - [`types`]: type expressions, signatures, contracts, implementation units
//! - [`syntax`]: lexer, declaration parser and verbatim printer
//! - [`model`]: [`SourceModel`] lookup tables over one package
//! - [`config`]: `resync.yaml`
//! - [`error`]: [`LoadError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod model;
pub mod syntax;
pub mod types;

pub use config::{Config, FormatterConfig};
pub use error::{ConfigError, LoadError};
pub use model::SourceModel;
pub use syntax::{Import, SourceFile};
pub use types::{
    ChanDir, Contract, ContractMethod, ImplMethod, ImplementationUnit, MethodSignature, Param,
    TypeExpr,
};
