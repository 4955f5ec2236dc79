//! Protocol implementations

pub mod esl;
