mod flow_assignment;

pub use flow_assignment::FlowAssignment;
