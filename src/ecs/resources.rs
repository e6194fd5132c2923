/// Seconds simulated by the current dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickDelta(pub f32);
