//! External service clients/adapters (Google REST APIs over `reqwest`).
//!
//! Both clients take an already-built `reqwest::Client`, so connection pools
//! are shared and timeouts are the caller's decision. Authentication is a
//! plain bearer token; obtaining and refreshing it is out of scope.

pub mod firestore;
pub mod identity_toolkit;

pub use firestore::FirestoreClient;
pub use identity_toolkit::IdentityToolkitClient;

/// Response body for error reporting, truncated to keep log lines short.
async fn error_body(response: reqwest::Response) -> String {
    const LIMIT: usize = 512;

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > LIMIT {
        let mut cut = LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
