use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::form::{AuthMode, CredentialForm};
use crate::gate::{GateState, NoticeKind, Outcome, VerificationGate};
use crate::provider::IdentityClient;
use crate::session::SessionClient;
use anyhow::Result;
use secrecy::ExposeSecret;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Handle the sign-up / sign-in action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let provider = IdentityClient::new(
        &globals.provider_url,
        globals.api_key.clone(),
        globals.timeout,
    )?;

    let sessions = SessionClient::new(&globals.session_url, globals.timeout)?;

    let mut form;

    let mode = match &action {
        Action::SignUp {
            name,
            email,
            password,
        } => {
            form = CredentialForm::new(AuthMode::SignUp);
            form.set_name(name);
            form.set_email(email);
            form.set_password(password.expose_secret());
            AuthMode::SignUp
        }
        Action::SignIn { email, password } => {
            form = CredentialForm::new(AuthMode::SignIn);
            form.set_email(email);
            form.set_password(password.expose_secret());
            AuthMode::SignIn
        }
    };

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            for error in &errors {
                eprintln!("{:?}: {}", error.field, error.message);
            }
            anyhow::bail!("validation failed");
        }
    };

    let mut gate =
        VerificationGate::new(provider, sessions).with_call_timeout(globals.timeout);

    render(&gate.submit(mode, credentials).await);

    // The pending screen: resend, check, or go back until the machine
    // leaves AwaitingVerification.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while *gate.state() == GateState::AwaitingVerification {
        let email = gate.ui().map(|ui| ui.email.clone()).unwrap_or_default();
        println!("Verification pending for {email}. [r]esend, [c]heck, [b]ack:");

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "r" | "resend" => render(&gate.resend().await),
            "c" | "check" => render(&gate.check_status().await),
            "b" | "back" => render(&gate.back()),
            "" => {}
            other => eprintln!("unknown command: {other}"),
        }
    }

    if *gate.state() == GateState::Authenticated {
        if let Some(profile) = gate.bridge().current_user().await? {
            info!("session established for {}", profile.email);
            println!("Signed in as {} <{}>", profile.name, profile.email);
        }
    }

    Ok(())
}

fn render(outcome: &Outcome) {
    for notice in &outcome.notices {
        match notice.kind {
            NoticeKind::Success => println!("{}", notice.message),
            NoticeKind::Info => println!("{}", notice.message),
            NoticeKind::Error => eprintln!("{}", notice.message),
        }
    }

    if let Some(redirect) = outcome.redirect {
        info!("redirect: {:?}", redirect);
    }
}
