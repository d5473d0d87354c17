/// Middleware modules for the API server
///
/// - `security`: Security response headers
///
/// Bearer authentication is a `from_fn_with_state` layer in `app`.

pub mod security;
