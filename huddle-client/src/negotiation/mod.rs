mod engine;

pub use engine::{NegotiationEffect, NegotiationEngine, NegotiationEvent, NegotiationState};
