/*! Unit coverage for the lowering.
 *
 * Most tests run the lowering against [`recording::RecordingEmitter`], a fake backend that logs
 * every instruction it is asked for, so the exact instruction choice for each expression, cast
 * and loop shape can be asserted without a native target. End-to-end execution lives in the
 * crate's `tests/` directory.
 */

#![allow(unused_imports)]
#![allow(unused_variables)]

mod recording;
mod stmt_tests;
