//! Flight controller address selection.
//!
//! The operator types either a preset name (`tello`, `laptop`, or any name in
//! the config) or a literal host, in which case a port is asked for as well.
//! The result is resolved once and never changes for the rest of the run.

use std::net::{SocketAddr, ToSocketAddrs};

use tellopad_types::TelloError;

use crate::config::Config;

/// What the first prompt answer refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChoice {
    /// A named preset, already resolved with the configured command port.
    Preset(SocketAddr),
    /// A literal host; the port still has to be asked for.
    Host(String),
}

/// Classify the operator's answer to "Enter target IP".
///
/// # Errors
///
/// [`TelloError::InvalidTarget`] for an empty answer or a preset whose
/// address does not resolve.
pub fn classify(answer: &str, cfg: &Config) -> Result<TargetChoice, TelloError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(TelloError::InvalidTarget("no target entered".to_string()));
    }
    match cfg.presets.get(answer) {
        Some(host) => resolve(host, cfg.command_port).map(TargetChoice::Preset),
        None => Ok(TargetChoice::Host(answer.to_string())),
    }
}

/// Parse the answer to "Enter target port".
///
/// # Errors
///
/// [`TelloError::InvalidTarget`] unless the answer is a port in `1..=65535`.
pub fn parse_port(answer: &str) -> Result<u16, TelloError> {
    match answer.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(TelloError::InvalidTarget(format!(
            "'{}' is not a valid port number",
            answer.trim()
        ))),
        Ok(port) => Ok(port),
    }
}

/// Resolve `host:port`, preferring an IPv4 address.
///
/// # Errors
///
/// [`TelloError::InvalidTarget`] when the host does not resolve.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, TelloError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| TelloError::InvalidTarget(format!("{host}: {e}")))?
        .collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| TelloError::InvalidTarget(format!("{host}: no address found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tello_preset() {
        let cfg = Config::default();
        assert_eq!(
            classify("tello", &cfg).unwrap(),
            TargetChoice::Preset("192.168.10.1:8889".parse().unwrap())
        );
    }

    #[test]
    fn laptop_preset() {
        let cfg = Config::default();
        assert_eq!(
            classify(" laptop\n", &cfg).unwrap(),
            TargetChoice::Preset("192.168.1.13:8889".parse().unwrap())
        );
    }

    #[test]
    fn presets_are_case_sensitive() {
        let cfg = Config::default();
        assert_eq!(
            classify("Tello", &cfg).unwrap(),
            TargetChoice::Host("Tello".to_string())
        );
    }

    #[test]
    fn literal_host_needs_a_port() {
        let cfg = Config::default();
        assert_eq!(
            classify("10.0.0.5", &cfg).unwrap(),
            TargetChoice::Host("10.0.0.5".to_string())
        );
        assert_eq!(
            resolve("10.0.0.5", 8890).unwrap(),
            "10.0.0.5:8890".parse().unwrap()
        );
    }

    #[test]
    fn empty_answer_is_rejected() {
        assert!(matches!(
            classify("  ", &Config::default()),
            Err(TelloError::InvalidTarget(_))
        ));
    }

    #[test]
    fn port_parsing() {
        assert_eq!(parse_port("8889\n").unwrap(), 8889);
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("tello").is_err());
    }

    #[test]
    fn localhost_resolves() {
        let addr = resolve("localhost", 8889).unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8889);
    }
}
