pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::AuthMiddleware;
pub use password::PasswordService;
