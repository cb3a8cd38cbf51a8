//! Connection topology selection.
//!
//! Decides whether the client talks to a single node or distributes requests
//! over several. The distribution policy itself belongs to the transport.

use url::Url;

use crate::errors::SearchError;

/// How the client reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTopology {
    /// Every request goes to one node, without failover.
    SingleNode(Url),
    /// Requests are distributed round-robin over the nodes, in order.
    MultiNode(Vec<Url>),
}

impl ConnectionTopology {
    /// Parse node URIs and select a topology for them.
    pub fn parse<S: AsRef<str>>(uris: &[S]) -> Result<Self, SearchError> {
        let endpoints = uris
            .iter()
            .map(|uri| parse_endpoint(uri.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        select_topology(&endpoints)
    }

    /// The configured endpoints, in order.
    pub fn endpoints(&self) -> &[Url] {
        match self {
            ConnectionTopology::SingleNode(url) => std::slice::from_ref(url),
            ConnectionTopology::MultiNode(urls) => urls,
        }
    }

    pub fn is_multi_node(&self) -> bool {
        matches!(self, ConnectionTopology::MultiNode(_))
    }
}

/// Select the connection topology for an ordered list of endpoints.
///
/// One endpoint yields a single-node topology; more yield a multi-node one.
///
/// # Errors
///
/// * `SearchError::ConfigurationError` - If `endpoints` is empty
pub fn select_topology(endpoints: &[Url]) -> Result<ConnectionTopology, SearchError> {
    match endpoints {
        [] => Err(SearchError::configuration(
            "at least one engine node must be configured",
        )),
        [single] => Ok(ConnectionTopology::SingleNode(single.clone())),
        many => Ok(ConnectionTopology::MultiNode(many.to_vec())),
    }
}

fn parse_endpoint(uri: &str) -> Result<Url, SearchError> {
    let url = Url::parse(uri.trim())
        .map_err(|e| SearchError::configuration(format!("invalid node URI '{}': {}", uri, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SearchError::configuration(format!(
            "node URI '{}' must use http or https",
            uri
        )));
    }
    if url.host_str().is_none() {
        return Err(SearchError::configuration(format!(
            "node URI '{}' has no host",
            uri
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_single_endpoint() {
        let topology = select_topology(&[url("http://localhost:9200")]).unwrap();

        assert_eq!(
            topology,
            ConnectionTopology::SingleNode(url("http://localhost:9200"))
        );
        assert!(!topology.is_multi_node());
        assert_eq!(topology.endpoints().len(), 1);
    }

    #[test]
    fn test_multiple_endpoints_keep_order() {
        let endpoints: Vec<Url> = (9200..9205)
            .map(|port| url(&format!("http://localhost:{}", port)))
            .collect();

        let topology = select_topology(&endpoints).unwrap();

        assert!(topology.is_multi_node());
        assert_eq!(topology.endpoints(), endpoints.as_slice());
    }

    #[test]
    fn test_empty_endpoints() {
        let err = select_topology(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_parse() {
        let topology =
            ConnectionTopology::parse(&["http://node-a:9200", " https://node-b:9200 "]).unwrap();
        assert_eq!(topology.endpoints().len(), 2);
        assert_eq!(topology.endpoints()[1].host_str(), Some("node-b"));

        let empty: [&str; 0] = [];
        assert!(ConnectionTopology::parse(&empty).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_uris() {
        assert!(ConnectionTopology::parse(&["not a uri"]).is_err());
        assert!(ConnectionTopology::parse(&["ftp://localhost:21"]).is_err());

        let err = ConnectionTopology::parse(&["http://localhost:9200", "localhost"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
