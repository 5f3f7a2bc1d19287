//! Deferred queries.
//!
//! A [`Query`] accumulates clauses into a [`QueryState`]; a terminal
//! operation hands a copy of that state to the execution pipeline:
//!
//! 1. push an eligible where-clause down to the remote table
//! 2. refuse joins
//! 3. fetch
//! 4. stable multi-key sort
//! 5. residual filters: type, where (if not pushed), distinct
//! 6. windows: skip-while, skip, take-while, take
//! 7. projection

mod builder;
mod pipeline;
mod state;
mod terminal;

pub use builder::{JoinBuilder, Query};
pub use state::{
    Comparer, Direction, JoinSpec, OrderKey, OrderSpec, QueryOptions, QueryState, Source,
};
