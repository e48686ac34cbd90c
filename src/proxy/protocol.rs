//! Protocol classification.
//!
//! Labels a request REST, GraphQL or SOAP from its content type and path.
//! The label is used for observability and the `X-Protocol-Type` header
//! only; it never changes where a request goes.

use std::fmt;

use serde::{Deserialize, Serialize};

const SOAP_MEDIA_TYPES: [&str; 2] = ["application/soap+xml", "text/xml"];
const GRAPHQL_MEDIA_TYPE: &str = "application/graphql";
const GRAPHQL_PATH: &str = "/graphql";

/// Wire format of a mediated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolType {
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "GraphQL")]
    GraphQl,
    #[serde(rename = "SOAP")]
    Soap,
}

impl ProtocolType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolType::Rest => "REST",
            ProtocolType::GraphQl => "GraphQL",
            ProtocolType::Soap => "SOAP",
        }
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request. SOAP content types win over GraphQL markers; REST is
/// the default. Media types compare case-insensitively, the path does not.
pub fn classify(content_type: Option<&str>, path: &str) -> ProtocolType {
    let content_type = content_type.map(str::to_ascii_lowercase);
    let content_type = content_type.as_deref().unwrap_or_default();

    if SOAP_MEDIA_TYPES.iter().any(|m| content_type.contains(m)) {
        return ProtocolType::Soap;
    }

    if content_type.contains(GRAPHQL_MEDIA_TYPE) || path.contains(GRAPHQL_PATH) {
        return ProtocolType::GraphQl;
    }

    ProtocolType::Rest
}
