use crate::{AuthConfig, ServerConfig};

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};

#[test]
fn given_default_server_config_when_validate_then_ok() {
    assert_that!(ServerConfig::default().validate(), ok(anything()));
}

#[test]
fn given_hostname_when_validate_then_error() {
    let config = ServerConfig {
        host: String::from("localhost"),
        ..ServerConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_zero_port_when_validate_then_error() {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_blank_api_key_when_validate_then_error() {
    let config = AuthConfig {
        api_key: Some(String::from("   ")),
        ..AuthConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_zero_rate_limit_when_validate_then_error() {
    let config = AuthConfig {
        rate_limit_max_requests: 0,
        ..AuthConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}
