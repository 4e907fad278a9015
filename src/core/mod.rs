//! Data shared by the shell's subsystems: parsed commands and job records.

pub mod job;
pub mod parser;
