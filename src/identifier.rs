// src/identifier.rs
//! `did:zksync` identifier grammar and parser.
//!
//! A DID URL for this method has the form
//!
//! ```text
//! did:zksync:(testnet|mainnet):<identifier>[/path][?query][#fragment]
//! ```
//!
//! where `<identifier>` is either a UUID or base58 text decoding to exactly 16 bytes.
//! Parsing is a pure function: anything that does not match yields `None`.
//!
//! The resolver dispatches on the path shape through [`DidUrlKind`], which covers the
//! grammar family of this method: bare DIDs, versions, metadata and resources.

use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// DID method name.
pub const METHOD: &str = "zksync";

/// Raw length of a base58-encoded method-specific identifier.
pub const ID_BYTE_LENGTH: usize = 16;

const NETWORK_PATTERN: &str = "(testnet|mainnet)";
const IDENTIFIER_PATTERN: &str = "([A-Za-z0-9-]+(?::[A-Za-z0-9-]+)*)";

static DID_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^did:{METHOD}:{NETWORK_PATTERN}:{IDENTIFIER_PATTERN}(/[^?#]*)?(?:\?([^#]*))?(?:#(.*))?$"
    ))
    .expect("DID URL pattern is valid")
});

static VERSION_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/version/([A-Za-z0-9-]+)$").expect("version pattern is valid"));

static RESOURCE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/resources/([A-Za-z0-9-]+)(/metadata)?$").expect("resource pattern is valid")
});

/// Ledger network a DID lives on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Network token as it appears inside a DID.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(Error::InvalidDid(format!("unknown network `{other}`"))),
        }
    }
}

/// Which member of the DID URL grammar family a parsed identifier belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DidUrlKind {
    /// `did:zksync:<network>:<id>`
    Did,
    /// `.../version/<versionId>`
    Version(String),
    /// `.../versions`
    Versions,
    /// `.../metadata`
    Metadata,
    /// `.../resources/<resourceId>`
    Resource(String),
    /// `.../resources/<resourceId>/metadata`
    ResourceMetadata(String),
    /// Any other path; the method assigns it no meaning.
    Other,
}

/// A syntactically valid `did:zksync` DID URL, broken into its components.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParsedDid {
    /// The bare DID, without path, query or fragment.
    pub did: String,
    /// Always [`METHOD`].
    pub method: String,
    pub network: Network,
    /// Method-specific identifier.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Raw query string, without the leading `?`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Query parameters; a repeated key keeps its last value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl ParsedDid {
    /// Classifies the path of this DID URL.
    pub fn kind(&self) -> DidUrlKind {
        let Some(path) = self.path.as_deref() else {
            return DidUrlKind::Did;
        };
        match path {
            "" | "/" => DidUrlKind::Did,
            "/versions" => DidUrlKind::Versions,
            "/metadata" => DidUrlKind::Metadata,
            _ => {
                if let Some(caps) = VERSION_PATH.captures(path) {
                    if is_uuid(&caps[1]) {
                        return DidUrlKind::Version(caps[1].to_string());
                    }
                } else if let Some(caps) = RESOURCE_PATH.captures(path) {
                    if is_uuid(&caps[1]) {
                        let id = caps[1].to_string();
                        return match caps.get(2) {
                            Some(_) => DidUrlKind::ResourceMetadata(id),
                            None => DidUrlKind::Resource(id),
                        };
                    }
                }
                DidUrlKind::Other
            }
        }
    }
}

impl FromStr for ParsedDid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).ok_or_else(|| Error::InvalidDid(s.to_string()))
    }
}

impl fmt::Display for ParsedDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.did)?;
        if let Some(path) = &self.path {
            f.write_str(path)?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Parses a `did:zksync` DID URL.
///
/// Returns `None` for anything outside the grammar: a different method, an unknown
/// network token, a malformed identifier, or an identifier that is neither a UUID nor
/// base58 text decoding to exactly [`ID_BYTE_LENGTH`] bytes.
pub fn parse(did_url: &str) -> Option<ParsedDid> {
    let caps = DID_URL.captures(did_url)?;

    let network = caps[1].parse::<Network>().ok()?;
    let id = caps[2].to_string();
    if !is_valid_id(&id) {
        return None;
    }

    let path = caps.get(3).map(|m| m.as_str().to_string());
    let query = caps.get(4).map(|m| m.as_str().to_string());
    let params = query.as_deref().map(parse_query);
    let fragment = caps.get(5).map(|m| m.as_str().to_string());

    Some(ParsedDid {
        did: format_did(network, &id),
        method: METHOD.to_string(),
        network,
        id,
        path,
        query,
        params,
        fragment,
    })
}

/// Builds the bare DID for a network and method-specific id.
pub fn format_did(network: Network, id: &str) -> String {
    format!("did:{METHOD}:{network}:{id}")
}

/// Builds the resource address `<issuer_did>/resources/<resource_id>`.
pub fn resource_path(issuer_did: &str, resource_id: &str) -> String {
    format!("{issuer_did}/resources/{resource_id}")
}

/// Whether `id` is a UUID or base58 text decoding to exactly 16 bytes.
pub fn is_valid_id(id: &str) -> bool {
    is_uuid(id)
        || bs58::decode(id)
            .into_vec()
            .map(|bytes| bytes.len() == ID_BYTE_LENGTH)
            .unwrap_or(false)
}

fn is_uuid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "0b1c5e6f-3f1a-4e0b-9a7c-2d4e5f607182";

    fn base58_of(len: usize) -> String {
        bs58::encode(vec![7u8; len]).into_string()
    }

    #[test]
    fn parses_bare_uuid_did() {
        let did = format!("did:zksync:testnet:{UUID}");
        let parsed = parse(&did).unwrap();

        assert_eq!(parsed.did, did);
        assert_eq!(parsed.method, "zksync");
        assert_eq!(parsed.network, Network::Testnet);
        assert_eq!(parsed.id, UUID);
        assert_eq!(parsed.path, None);
        assert_eq!(parsed.params, None);
        assert_eq!(parsed.fragment, None);
        assert_eq!(parsed.kind(), DidUrlKind::Did);
    }

    #[test]
    fn format_round_trips_network_and_id() {
        for network in [Network::Testnet, Network::Mainnet] {
            let id = Uuid::new_v4().to_string();
            let parsed = parse(&format_did(network, &id)).unwrap();
            assert_eq!(parsed.network, network);
            assert_eq!(parsed.id, id);
        }
    }

    #[test]
    fn accepts_base58_of_exactly_sixteen_bytes() {
        let id = base58_of(16);
        let parsed = parse(&format!("did:zksync:mainnet:{id}")).unwrap();
        assert_eq!(parsed.network, Network::Mainnet);
        assert_eq!(parsed.id, id);
    }

    #[test]
    fn rejects_base58_of_other_lengths() {
        for len in [15, 17] {
            let did = format!("did:zksync:testnet:{}", base58_of(len));
            assert_eq!(parse(&did), None, "{len} bytes should be rejected");
        }
    }

    #[test]
    fn rejects_non_matching_strings() {
        let cases = [
            "".to_string(),
            "did".to_string(),
            format!("did:cheqd:testnet:{UUID}"),
            format!("did:zksync:devnet:{UUID}"),
            format!("did:zksync:testnet:{UUID}!"),
            "did:zksync:testnet:".to_string(),
            "did:zksync:testnet:not-a-uuid".to_string(),
            format!("did:zksync:testnet:{UUID}:{UUID}"),
            format!(" did:zksync:testnet:{UUID}"),
        ];
        for case in cases {
            assert_eq!(parse(&case), None, "`{case}` should not parse");
        }
    }

    #[test]
    fn uppercase_uuid_is_legal() {
        let upper = UUID.to_uppercase();
        let parsed = parse(&format!("did:zksync:testnet:{upper}")).unwrap();
        assert_eq!(parsed.id, upper);
    }

    #[test]
    fn extracts_path_query_and_fragment() {
        let url = format!("did:zksync:testnet:{UUID}/some/path?service=files&relativeRef=%2Fa&flag#key-1");
        let parsed = parse(&url).unwrap();

        assert_eq!(parsed.path.as_deref(), Some("/some/path"));
        let params = parsed.params.clone().unwrap();
        assert_eq!(params.get("service").map(String::as_str), Some("files"));
        assert_eq!(params.get("relativeRef").map(String::as_str), Some("%2Fa"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
        assert_eq!(parsed.fragment.as_deref(), Some("key-1"));
        assert_eq!(parsed.kind(), DidUrlKind::Other);
    }

    #[test]
    fn classifies_grammar_family() {
        let did = format!("did:zksync:testnet:{UUID}");
        let resource = Uuid::new_v4().to_string();
        let cases = [
            (did.clone(), DidUrlKind::Did),
            (format!("{did}/versions"), DidUrlKind::Versions),
            (format!("{did}/metadata"), DidUrlKind::Metadata),
            (format!("{did}/version/{resource}"), DidUrlKind::Version(resource.clone())),
            (format!("{did}/resources/{resource}"), DidUrlKind::Resource(resource.clone())),
            (
                format!("{did}/resources/{resource}/metadata"),
                DidUrlKind::ResourceMetadata(resource.clone()),
            ),
            (format!("{did}/resources/abc"), DidUrlKind::Other),
        ];
        for (url, kind) in cases {
            assert_eq!(parse(&url).unwrap().kind(), kind, "{url}");
        }
    }

    #[test]
    fn display_restores_the_url() {
        let url = format!("did:zksync:mainnet:{UUID}/resources/{UUID}?a=1#frag");
        assert_eq!(parse(&url).unwrap().to_string(), url);
    }

    #[test]
    fn display_keeps_query_order_and_repeated_keys() {
        let url = format!("did:zksync:testnet:{UUID}?b=2&a=1&flag&a=3");
        let parsed = parse(&url).unwrap();

        assert_eq!(parsed.to_string(), url);
        assert_eq!(parsed.query.as_deref(), Some("b=2&a=1&flag&a=3"));
        let params = parsed.params.unwrap();
        assert_eq!(params.get("a").map(String::as_str), Some("3"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn from_str_reports_invalid_did() {
        let err = "did:web:example.com".parse::<ParsedDid>().unwrap_err();
        assert!(matches!(err, Error::InvalidDid(_)));
    }
}
