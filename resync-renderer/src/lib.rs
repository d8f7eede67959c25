//! # resync-renderer
//!
//! Tera-based renderer for generated Go source: method stubs, receiver type
//! declarations and file headers.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resync_core::types::{MethodSignature, Param, TypeExpr};
//! use resync_renderer::StubRenderer;
//!
//! fn stub() -> Result<String, resync_renderer::RenderError> {
//!     let renderer = StubRenderer::new(None)?;
//!     let sig = MethodSignature::new(
//!         vec![Param::named("ctx", TypeExpr::qualified("context", "Context"))],
//!         vec![Param::unnamed(TypeExpr::basic("error"))],
//!     );
//!     renderer.render_method("mutationResolver", "Ping", &sig, None)
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{FileHeaderContext, MethodStubContext, NameTypePair, ReceiverContext};
pub use engine::StubRenderer;
pub use error::RenderError;
