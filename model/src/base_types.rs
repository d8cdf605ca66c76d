pub type NodeName = String;
pub type EdgeKey = String;
pub type Color = String;

/// Capacity assumed for edges that do not carry one.
pub const DEFAULT_CAPACITY: f64 = 500.0;
