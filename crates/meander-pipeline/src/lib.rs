//! # Meander Pipeline
//!
//! Fixed-order request pipeline for the Meander platform.
//!
//! Every request, whatever surface it enters through, runs as an
//! [`Exchange`] dispatched through the same shape of stage chain:
//!
//! ```text
//! Exchange → Logging → [caller stages...] → Containment → Handler
//!                                                            ↓
//! Reply   ←──────────────────────────────────────────────────┘
//! ```
//!
//! The wrapping is immutable: logging always opens the ambient request
//! scope first, and containment always sits directly around the handler
//! so raw faults become failure replies instead of crossing the
//! pipeline boundary. Only the caller stages in between are
//! registrable, and they run in registration order.
//!
//! ## Key Properties
//!
//! - **Fixed wrapping**: logging and containment cannot be removed or
//!   displaced by caller stages
//! - **Short-circuiting**: any stage can reply without advancing; the
//!   handler and later stages never run
//! - **Additive context**: stages pass the exchange forward by value,
//!   and slots they set are visible downstream
//! - **Ambient logging**: everything under dispatch reaches the request
//!   logger without threading it through signatures
//!
//! ## Example
//!
//! ```
//! use meander_core::Reply;
//! use meander_pipeline::stages::CanonicalIdStage;
//! use meander_pipeline::{Exchange, Pipeline, StageResult};
//!
//! async fn get_note(exchange: Exchange) -> StageResult {
//!     let id = exchange.params().unwrap()["id"].clone();
//!     Ok(Reply::ok(serde_json::json!({ "id": id })))
//! }
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder().stage(CanonicalIdStage::new()).build();
//! assert_eq!(pipeline.stage_names(), vec!["logging", "canonical_id", "containment"]);
//!
//! let exchange = Exchange::for_api("/notes/{id}", http::Method::GET)
//!     .with_params(serde_json::json!({ "id": "0193AEF25B6C7000800022F1C60A86CD" }));
//! let reply = pipeline.dispatch(exchange, &get_note).await.unwrap();
//! assert_eq!(
//!     reply.data(),
//!     Some(&serde_json::json!({ "id": "0193aef2-5b6c-7000-8000-22f1c60a86cd" }))
//! );
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/meander-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod exchange;
pub mod stage;
pub mod stages;

// Re-export main types at crate root
pub use dispatch::{BoxedStage, Pipeline, PipelineBuilder};
pub use exchange::Exchange;
pub use stage::{BoxFuture, FnStage, Next, ServiceHandler, Stage, StageResult};
