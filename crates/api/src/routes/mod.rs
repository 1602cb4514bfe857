pub mod health;
pub mod invocations;
