//! The plugin system works by registering to events.
//!
//! # Example
//! ```rust
//! use aggressor::*;
//! use aggressor::plugins::*;
//!
//! struct MyListener;
//!
//! impl EventListener for MyListener {
//!     fn name(&self) -> &'static str {
//!         "my_listener"
//!     }
//!     fn on_event(&mut self, event: AggressorEvents) {
//!         match event {
//!             AggressorEvents::RunStart(plan) => {
//!                 println!("Starting: {:?}", plan.aggressor);
//!             }
//!             _ => {}
//!         }
//!     }
//!     fn as_any(&mut self) -> &mut dyn std::any::Any {
//!         self
//!     }
//! }
//! let mut runner = AggressorRunner::new(Clock::wall());
//! let events = runner.get_event_manager();
//! events.add_listener_if_absent(MyListener);
//!
//! ```
//!

pub mod events;
pub mod perf_counter;
pub use events::*;
pub use perf_counter::*;
