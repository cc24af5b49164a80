use clap::Parser;
use std::path::PathBuf;

/// Command-line options for the chess server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(short, long, env = "CHESS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Directory served under /static, with index.html as the landing page
    #[arg(long, env = "CHESS_STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CHESS_LOG", default_value = "info")]
    pub log_filter: String,

    /// Trust X-User-Id / X-User-Name headers set by an authenticating proxy
    #[arg(long, env = "CHESS_TRUST_IDENTITY_HEADERS")]
    pub trust_identity_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            static_dir: PathBuf::from("./static"),
            log_filter: "info".to_string(),
            trust_identity_headers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parsed_defaults() {
        let parsed = Config::try_parse_from(["chess_arena"]).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.bind, defaults.bind);
        assert_eq!(parsed.static_dir, defaults.static_dir);
        assert_eq!(parsed.log_filter, defaults.log_filter);
    }

    #[test]
    fn flags_override_defaults() {
        let parsed = Config::try_parse_from([
            "chess_arena",
            "--bind",
            "0.0.0.0:9000",
            "--trust-identity-headers",
        ])
        .unwrap();
        assert_eq!(parsed.bind, "0.0.0.0:9000");
        assert!(parsed.trust_identity_headers);
    }
}
