//! # mockpay-api
//!
//! HTTP API layer for mockpay-rs.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/create-mock-payment-session` | Create payment session |
//! | GET | `/api/payment-session/:id` | Session status |
//! | POST | `/api/complete-payment` | Complete a session |
//! | GET | `/api/order/:id` | Order details |
//! | GET | `/api/orders?email=` | Orders by customer |
//! | GET | `/api/admin/orders` | All orders |
//! | PATCH | `/api/admin/order/:id/status` | Update order status |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
