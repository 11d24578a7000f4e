//! The game every subcommand plays.

pub use connect4::Engine;

pub fn engine() -> Engine {
    Engine::new()
}
