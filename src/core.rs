pub mod block;
pub mod deadline;
pub mod inputs;
pub mod interval;
pub mod merge;
pub mod metrics;
pub mod night;
pub mod normalize;
pub mod planner;
pub mod rate;
pub mod timestamp;
