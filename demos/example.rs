use std::sync::Arc;

use chat_auth_client::{AuthClient, Config, FileCredentialStore, LogoutOutcome, SessionEvent};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Reads CHAT_API_URL / CHAT_API_TIMEOUT_SECS, falling back to localhost:8080
    let cfg = Config::from_env()?;
    let store = Arc::new(FileCredentialStore::new("credentials.json"));
    let client = AuthClient::new(cfg, store)?;

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let SessionEvent::SessionExpired { reason } = event {
                eprintln!("session expired, please log in again: {reason}");
            }
        }
    });

    if !client.is_authenticated()? {
        let resp = client.login("ada@example.com", "correct horse").await?;
        println!("{}", resp.message);
        if let Some(expires) = resp.credentials().expires_at(jiff::Timestamp::now()) {
            println!("access token valid until {expires}");
        }
    }

    let me = client.get("/api/users/me").await?;
    println!("me: {}", me.text());

    if let LogoutOutcome::LocalOnly(notice) = client.logout().await? {
        eprintln!("{notice}");
    }
    Ok(())
}
