//! Plan validation core — types, parsing, graph, cycles, ordering, rules,
//! reports, feedback, and the retry loop around them.

pub mod cycles;
pub mod feedback;
pub mod graph;
pub mod parser;
pub mod procedure;
pub mod retry;
pub mod rules;
pub mod sequencer;
pub mod types;
pub mod validator;
pub mod workspace;
