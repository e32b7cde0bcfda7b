//! Root greeting.

pub const GREETING: &str = "Hello from the backend!";

pub async fn index() -> &'static str {
    GREETING
}
