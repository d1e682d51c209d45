// Composition root for the reviews bounded context.
//
// Responsibilities
// - Read config from environment.
// - Instantiate concrete infrastructure implementations.
// - Wire implementations into use case handlers.
// - Spawn background workers (resync loop).

pub mod cli;
pub mod config;
pub mod state;
pub mod workers;
