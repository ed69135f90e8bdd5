//! # coursehub-payment
//!
//! Client for the remote payment gateway. The ledger stores major-unit
//! decimals; conversion to the gateway's minor unit happens only here.

pub mod dto;
pub mod error;
pub mod gateway;
pub mod money;
pub mod paystack;
pub mod reference;
pub mod scripted;

pub use error::GatewayError;
pub use gateway::PaymentGateway;
pub use paystack::PaystackGateway;
pub use reference::new_reference;
pub use scripted::ScriptedGateway;
