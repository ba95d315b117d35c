//! Tablescope core: the query-expression compiler and the result-set
//! mutation engine.
//!
//! The pipeline is:
//!
//! 1. **Parse**: filter-language text becomes an [`expression::Expr`] AST.
//! 2. **Compile**: the AST plus table metadata becomes an
//!    [`expression::ExecutionPlan`] (today always a scan filter).
//! 3. **Read**: [`services::TableReadService`] executes the plan through a
//!    [`provider::TableProvider`] and materializes a
//!    [`resultset::ResultSet`].
//! 4. **Edit**: the result set tracks per-item dirty/marked/new state and
//!    applies attribute-path addressed mutations.
//! 5. **Write**: [`services::TableWriteService`] reconciles dirty items back
//!    through the provider.

pub mod config;
pub mod events;
pub mod expression;
pub mod memory;
pub mod path;
pub mod provider;
pub mod resultset;
pub mod services;

pub use config::Config;
pub use events::Event;
pub use expression::{compile, parse};
pub use memory::MemoryProvider;
pub use path::AttrPath;
pub use provider::{ProviderError, TableProvider};
pub use resultset::{ItemIndex, ItemState, NewValue, ResultSet};
pub use services::{TableReadService, TableWriteService};
