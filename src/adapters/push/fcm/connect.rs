use super::FcmConfig;
use crate::adapters::push::{ConnectOption, Http2Session, Http2Transport, Scheme};
use crate::error::TransportError;

const HTTPS_PORT: u16 = 443;

pub(super) fn connect_options(config: &FcmConfig) -> Vec<ConnectOption> {
    let mut options = vec![
        ConnectOption::ActiveOnce,
        ConnectOption::RawPacket,
        ConnectOption::ReuseAddr,
        ConnectOption::Alpn(vec!["h2".to_string()]),
        ConnectOption::Binary,
    ];
    if config.port != HTTPS_PORT {
        options.push(ConnectOption::Port(config.port));
    }
    options
}

#[tracing::instrument(level = "debug", skip_all, fields(host = %config.host, port = config.port), err)]
pub(super) async fn connect(
    config: &FcmConfig,
    transport: &dyn Http2Transport,
) -> Result<Box<dyn Http2Session>, TransportError> {
    transport.connect(&config.host, Scheme::Https, &connect_options(config)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::push::StaticTokenProvider;
    use crate::adapters::push::fcm::FcmOptions;
    use std::sync::Arc;

    fn config_with_port(port: u16) -> FcmConfig {
        FcmConfig::new(FcmOptions::new("p1", Arc::new(StaticTokenProvider::new("t"))).port(port)).unwrap()
    }

    #[test]
    fn test_default_port_adds_no_port_option() {
        let options = connect_options(&config_with_port(443));

        assert_eq!(options.len(), 5);
        assert!(!options.iter().any(|o| matches!(o, ConnectOption::Port(_))));
        assert!(options.contains(&ConnectOption::Alpn(vec!["h2".to_string()])));
    }

    #[test]
    fn test_custom_port_is_appended() {
        let options = connect_options(&config_with_port(5228));

        assert_eq!(options.last(), Some(&ConnectOption::Port(5228)));
        assert_eq!(options.iter().filter(|o| matches!(o, ConnectOption::Port(_))).count(), 1);
    }
}
