//! Integration tests for web server configuration and state construction.

use std::path::PathBuf;
use std::time::Duration;

use nirdeshak_relay::{ChatConfig, RelayConfig, SpeechConfig};
use nirdeshak_web::{WebConfig, WebServer};
use url::Url;

fn relay_config(speech: bool) -> RelayConfig {
    RelayConfig {
        chat: ChatConfig {
            api_key: "test-key".into(),
            endpoint: Url::parse("http://127.0.0.1:1/chat").unwrap(),
            model: "gpt-4o".into(),
        },
        speech: speech.then(|| SpeechConfig {
            api_key: "speech-key".into(),
            base_url: Url::parse("http://127.0.0.1:1").unwrap(),
        }),
        upstream_timeout: Duration::from_secs(30),
        allowed_origins: vec!["http://localhost:5173".into()],
    }
}

#[test]
fn web_config_defaults() {
    let config = WebConfig::default();
    assert_eq!(config.bind_addr, "0.0.0.0");
    assert_eq!(config.port, 8000);
    assert_eq!(config.static_dir, PathBuf::from("static"));
}

#[test]
fn web_config_custom() {
    let config = WebConfig {
        bind_addr: "127.0.0.1".into(),
        port: 8080,
        static_dir: PathBuf::from("/srv/www"),
    };
    let server = WebServer::new(config, &relay_config(false)).unwrap();
    assert_eq!(server.addr(), "127.0.0.1:8080");
}

#[test]
fn server_builds_with_and_without_speech() {
    assert!(WebServer::new(WebConfig::default(), &relay_config(true)).is_ok());
    assert!(WebServer::new(WebConfig::default(), &relay_config(false)).is_ok());
}

#[test]
fn wildcard_origin_does_not_panic() {
    let mut relay = relay_config(false);
    relay.allowed_origins = vec!["*".into(), "https://nirdeshak-ai.vercel.app".into()];
    let server = WebServer::new(WebConfig::default(), &relay).unwrap();
    let _router = server.router();
}
