use crate::turnstile;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        NonEmptyStringValueParser, ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("turngate")
        .about("Turnstile-gated authentication front-end")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("turnstile-secret")
                .short('s')
                .long("turnstile-secret")
                .help("Cloudflare Turnstile secret key")
                .env("TURNSTILE_SECRET")
                .value_parser(NonEmptyStringValueParser::new())
                .required(true),
        )
        .arg(
            Arg::new("turnstile-endpoint")
                .long("turnstile-endpoint")
                .help("Turnstile siteverify URL, override for testing")
                .default_value(turnstile::DEFAULT_ENDPOINT)
                .env("TURNSTILE_ENDPOINT"),
        )
        .arg(
            Arg::new("allowed-origins")
                .long("allowed-origins")
                .help("Comma-separated list of origins allowed by the CORS policy")
                .env("ALLOWED_ORIGINS")
                .value_delimiter(',')
                .default_values(["http://localhost:3000", "http://localhost:5173"]),
        )
        .arg(
            Arg::new("verifier-timeout-ms")
                .long("verifier-timeout-ms")
                .help("Deadline in milliseconds for the outbound siteverify exchange")
                .default_value("5000")
                .env("VERIFIER_TIMEOUT_MS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("TURNGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "turngate");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Turnstile-gated authentication front-end"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_port_and_secret() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "turngate",
            "--port",
            "8080",
            "--turnstile-secret",
            "0x4AAAAAAABBBBBBBBCCCCCCCC",
        ]);

        assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(8080));
        assert_eq!(
            matches
                .get_one::<String>("turnstile-secret")
                .map(|s| s.to_string()),
            Some("0x4AAAAAAABBBBBBBBCCCCCCCC".to_string())
        );
        assert_eq!(
            matches
                .get_one::<String>("turnstile-endpoint")
                .map(|s| s.to_string()),
            Some(turnstile::DEFAULT_ENDPOINT.to_string())
        );
        assert_eq!(
            matches.get_one::<u64>("verifier-timeout-ms").map(|s| *s),
            Some(5000)
        );
    }

    #[test]
    fn test_default_origins() {
        let command = new();
        let matches =
            command.get_matches_from(vec!["turngate", "--turnstile-secret", "secret-key"]);

        let origins: Vec<String> = matches
            .get_many::<String>("allowed-origins")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string()
            ]
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORT", Some("443")),
                ("TURNSTILE_SECRET", Some("secret-from-env")),
                ("TURNSTILE_ENDPOINT", Some("http://localhost:9090/verify")),
                (
                    "ALLOWED_ORIGINS",
                    Some("https://one.example,https://two.example"),
                ),
                ("VERIFIER_TIMEOUT_MS", Some("2500")),
                ("TURNGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["turngate"]);
                assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(443));
                assert_eq!(
                    matches
                        .get_one::<String>("turnstile-secret")
                        .map(|s| s.to_string()),
                    Some("secret-from-env".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<String>("turnstile-endpoint")
                        .map(|s| s.to_string()),
                    Some("http://localhost:9090/verify".to_string())
                );
                let origins: Vec<String> = matches
                    .get_many::<String>("allowed-origins")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                assert_eq!(
                    origins,
                    vec![
                        "https://one.example".to_string(),
                        "https://two.example".to_string()
                    ]
                );
                assert_eq!(
                    matches.get_one::<u64>("verifier-timeout-ms").map(|s| *s),
                    Some(2500)
                );
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        temp_env::with_vars([("TURNSTILE_SECRET", None::<String>)], || {
            let command = new();
            let result = command.try_get_matches_from(vec!["turngate"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_empty_secret_is_an_error() {
        temp_env::with_vars([("TURNSTILE_SECRET", Some(""))], || {
            let command = new();
            let result = command.try_get_matches_from(vec!["turngate"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("TURNGATE_LOG_LEVEL", Some(level)),
                    ("TURNSTILE_SECRET", Some("secret-key")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["turngate"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").map(|s| *s),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("TURNGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "turngate".to_string(),
                    "--turnstile-secret".to_string(),
                    "secret-key".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }
}
