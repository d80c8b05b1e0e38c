pub mod chart;
pub mod consts;
pub mod enhance;
pub mod error;
pub mod frame;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod report;
