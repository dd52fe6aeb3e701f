pub mod api;
pub mod job;
pub mod results;
pub mod wordcount;

pub use api::*;
pub use job::*;
pub use results::*;
