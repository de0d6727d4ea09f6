//! Command builders, grouped by data type.
//!
//! Every builder is an instance of one of the batch's three construction
//! primitives: bare append, append with a reply shape check, or append with
//! a shape check and a conversion.

mod generic;
mod hashes;
mod lists;
mod server;
mod sets;
mod sorted_sets;
mod streams;
mod strings;
