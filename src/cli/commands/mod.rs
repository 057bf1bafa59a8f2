use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
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

    Command::new("prepwise-auth")
        .about("Authentication and email verification for the PrepWise interview platform")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new("provider-url")
                .long("provider-url")
                .help("Identity provider base URL")
                .env("PREPWISE_PROVIDER_URL")
                .global(true),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .help("Identity provider API key")
                .env("PREPWISE_API_KEY")
                .global(true),
        )
        .arg(
            Arg::new("session-url")
                .long("session-url")
                .help("Session service base URL")
                .env("PREPWISE_SESSION_URL")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Per-call timeout in seconds for provider and session requests")
                .default_value("30")
                .env("PREPWISE_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PREPWISE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("sign-up")
                .about("Create an account and start email verification")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name for the profile")
                        .required(true),
                )
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Email address")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Password")
                        .env("PREPWISE_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("sign-in")
                .about("Sign in and establish a session")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Email address")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Password")
                        .env("PREPWISE_PASSWORD")
                        .required(true),
                ),
        )
}
