/*! Static passes over finished statement trees.
 *
 * The assembler needs to know which buffers a pipeline touches before it can declare the entry
 * function's parameters. These passes walk the tree without side effects.
 */

pub mod buffers;

pub use buffers::{buffers_in_expr, buffers_in_stmt};
