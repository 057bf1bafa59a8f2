use anyhow::Result;
use prepwise_auth::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::SignUp { .. } | Action::SignIn { .. } => {
            actions::auth::handle(action, &globals).await?;
        }
    }

    Ok(())
}
