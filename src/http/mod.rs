pub mod client;

pub use client::{
    Acknowledgement, HttpProcessingClient, ProcessingService, TransportError, WithdrawalList,
};
