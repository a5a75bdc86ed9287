//! Access-token handling. Tokens carry everything needed to build the
//! [`ActorContext`](faultline_core::actor::ActorContext) of a request.

pub mod jwt;
