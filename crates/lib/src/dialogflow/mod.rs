//! Dialogflow NLU backend: the `NluBackend` seam, the ES v2 REST client, wire types,
//! and decoding of protobuf `Struct` parameter trees.

mod client;
pub mod struct_value;
mod types;

pub use client::{DialogflowClient, DialogflowError, NluBackend, DEFAULT_ENDPOINT};
pub use struct_value::ParameterFormat;
pub use types::{
    DetectIntentRequest, DetectIntentResponse, Intent, QueryInput, QueryResult, TextInput,
};
