//! Patchbay Library
//!
//! Typed patch graphs for modular instruments and note sequences, and the
//! compilers that reduce them to the nested definitions a synthesis engine
//! plays.

pub mod dsp;
pub mod engine;
pub mod graph;
pub mod modules;
pub mod persistence;
