pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod host;
pub mod io;
pub mod pipeline;
pub mod preprocess;
pub mod range;
pub mod report;
pub mod score;
pub mod segment;
pub mod sequence;
