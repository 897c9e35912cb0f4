pub mod bucket;
pub mod object;
pub mod outcome;
pub mod queue;
pub mod topic;

pub use bucket::*;
pub use object::*;
pub use outcome::*;
pub use queue::*;
pub use topic::*;
