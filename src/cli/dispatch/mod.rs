use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    // Closure to return subcommand matches
    let sub_m = |subcommand| -> Result<&clap::ArgMatches> {
        matches
            .subcommand_matches(subcommand)
            .context("arguments not found")
    };

    let mut globals = GlobalArgs::new(
        matches
            .get_one::<String>("provider-url")
            .cloned()
            .context("missing required argument: --provider-url")?,
        matches
            .get_one::<String>("session-url")
            .cloned()
            .context("missing required argument: --session-url")?,
    );

    globals.set_api_key(SecretString::from(
        matches
            .get_one::<String>("api-key")
            .cloned()
            .context("missing required argument: --api-key")?,
    ));

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        globals.set_timeout(Duration::from_secs(*timeout));
    }

    let action = match matches.subcommand_name() {
        Some("sign-up") => {
            let matches = sub_m("sign-up")?;

            Action::SignUp {
                name: matches
                    .get_one::<String>("name")
                    .cloned()
                    .context("missing required argument: --name")?,
                email: matches
                    .get_one::<String>("email")
                    .cloned()
                    .context("missing required argument: --email")?,
                password: SecretString::from(
                    matches
                        .get_one::<String>("password")
                        .cloned()
                        .context("missing required argument: --password")?,
                ),
            }
        }
        Some("sign-in") => {
            let matches = sub_m("sign-in")?;

            Action::SignIn {
                email: matches
                    .get_one::<String>("email")
                    .cloned()
                    .context("missing required argument: --email")?,
                password: SecretString::from(
                    matches
                        .get_one::<String>("password")
                        .cloned()
                        .context("missing required argument: --password")?,
                ),
            }
        }
        _ => anyhow::bail!("missing subcommand"),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn base_args() -> Vec<&'static str> {
        vec![
            "prepwise-auth",
            "--provider-url",
            "https://identity.example.dev",
            "--api-key",
            "test-key",
            "--session-url",
            "https://app.example.dev",
            "--timeout",
            "5",
        ]
    }

    #[test]
    fn test_dispatch_sign_up() {
        let mut args = base_args();
        args.extend([
            "sign-up", "--name", "Ada", "--email", "a@x.com", "--password", "abc",
        ]);

        let matches = commands::new().get_matches_from(args);
        let (action, globals) = handler(&matches).unwrap();

        assert_eq!(globals.provider_url, "https://identity.example.dev");
        assert_eq!(globals.api_key.expose_secret(), "test-key");
        assert_eq!(globals.timeout, Duration::from_secs(5));

        match action {
            Action::SignUp {
                name,
                email,
                password,
            } => {
                assert_eq!(name, "Ada");
                assert_eq!(email, "a@x.com");
                assert_eq!(password.expose_secret(), "abc");
            }
            Action::SignIn { .. } => panic!("expected sign-up action"),
        }
    }

    #[test]
    fn test_dispatch_sign_in() {
        let mut args = base_args();
        args.extend(["sign-in", "--email", "a@x.com", "--password", "abc"]);

        let matches = commands::new().get_matches_from(args);
        let (action, _) = handler(&matches).unwrap();

        assert!(matches!(action, Action::SignIn { .. }));
    }

    #[test]
    fn test_dispatch_missing_api_key() {
        temp_env::with_vars([("PREPWISE_API_KEY", None::<String>)], || {
            let args = vec![
                "prepwise-auth",
                "--provider-url",
                "https://identity.example.dev",
                "--session-url",
                "https://app.example.dev",
                "sign-in",
                "--email",
                "a@x.com",
                "--password",
                "abc",
            ];

            let matches = commands::new().get_matches_from(args);
            let result = handler(&matches);

            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("--api-key"));
        });
    }
}
