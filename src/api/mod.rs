//! HTTP API for publishing sites.
//!
//! # API Endpoints
//!
//! ## `/` (GET)
//!
//!   Redirects to `/api`.
//!
//! ## `/api` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"message":"Do you wanna build a sandcastle?"}`.
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/api` (POST)
//!
//!   Requires an `Authorization: Bearer <token>` header matching
//!   [`Config::token`][crate::config::Config::token], otherwise returns HTTP 401.
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   {
//!     "customer": "6f1c5b2e-3d4a-4b8c-9e7f-0a1b2c3d4e5f",
//!     "data": "<h1>Hello</h1>",
//!     "domain": "example.com"
//!   }
//!   ```
//!
//!  `customer` must be a version 1-5 UUID. `domain` may be an internationalised name; it is
//!  converted to ASCII before use and must then be a valid DNS name.
//!
//!  The page is written to `<sandcastles_dir>/<customer>/<domain>/index.html` and the domain's
//!  block in its [proxy config file][crate::caddy] is pointed at that directory. The config file
//!  and the domain's `tls` entry must already exist (HTTP 400 and HTTP 422 respectively
//!  otherwise).
//!
//!  On success returns HTTP 201 (Created) and a JSON response body of the form:
//!
//!  ```json
//!  { "message": "Updated site for example.com!", "success": true, "created": false, "reloaded": true }
//!  ```
//!
//!  `reloaded` is `null` when no reload command is configured and `false` when the reload
//!  failed. A failed reload doesn't undo the config write.
//!
//!  Errors are returned as `{"error": "<message>"}`.

mod api_error;
pub mod model;
mod routes;
pub mod server;

pub use server::new;
