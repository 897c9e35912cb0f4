pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use dto::*;
pub use error::*;
pub use handlers::*;
pub use middleware::*;
pub use router::*;
