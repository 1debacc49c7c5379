pub(crate) mod bootstrap;
mod cli;
mod commands;
pub(crate) mod runner;
