//! CLI command implementations.

pub(crate) mod marked;

pub(crate) use marked::MarkedArgs;
