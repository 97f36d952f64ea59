use thiserror::Error;

/// Failure to parse a serialized endpoint or connection id.
///
/// Ids are produced by [`crate::Endpoint::id`] and [`crate::ConnectionId`]'s
/// `Display` impl; a parse failure means an id was corrupted or constructed
/// by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointParseError {
    #[error("Illegal id string {0}")]
    IllegalEndpointId(String),

    #[error("Illegal connection id string {0}")]
    IllegalConnectionId(String),
}
