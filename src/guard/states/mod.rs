//! Runtime implementations of the guard behaviour states.

mod attack;
mod chase;
mod investigate;
mod patrol;

pub use attack::AttackState;
pub use chase::ChaseState;
pub use investigate::InvestigateState;
pub use patrol::PatrolState;
