use std::time::Duration;

use relay::settings::RelaySettings;
use serde_json::json;
use signaling::message::{ClientEvent, ServerEvent};
use tokio::time::sleep;

use crate::helper::{assert_silent, next_event, online_users, spawn_app_with, TestApp};

const RING_TIMEOUT: Duration = Duration::from_millis(500);

async fn spawn_tracking_app() -> TestApp {
    spawn_app_with(RelaySettings {
        call_tracking: true,
        ring_timeout: RING_TIMEOUT,
        ..RelaySettings::default()
    })
    .await
}

fn call_user(to: &str) -> ClientEvent {
    ClientEvent::CallInitiate {
        receiver_id: to.into(),
        signal_data: json!("offer"),
        call_type: "video".to_string(),
    }
}

fn answer(to: &str) -> ClientEvent {
    ClientEvent::CallAnswer {
        to: to.into(),
        signal_data: json!("answer"),
    }
}

#[actix_web::test]
async fn caller_is_told_when_target_is_offline() -> anyhow::Result<()> {
    let app = spawn_tracking_app().await;
    let mut alice = app.join(&["alice"]).await.remove(0);

    alice.send(&call_user("dave")).await?;
    assert_eq!(
        next_event(&mut alice).await,
        ServerEvent::UserNotOnline {
            receiver_id: "dave".into()
        }
    );
    Ok(())
}

#[actix_web::test]
async fn unanswered_call_times_out_on_both_sides() -> anyhow::Result<()> {
    let app = spawn_tracking_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;

    sockets[0].send(&call_user("bob")).await?;
    assert!(matches!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IncomingCall { .. }
    ));

    assert_eq!(
        next_event(&mut sockets[0]).await,
        ServerEvent::CallTimeout {
            receiver_id: "bob".into()
        }
    );
    assert_eq!(
        next_event(&mut sockets[1]).await,
        ServerEvent::MissedCall {
            from: "alice".into()
        }
    );
    Ok(())
}

#[actix_web::test]
async fn answered_call_does_not_time_out_and_makes_callee_busy() -> anyhow::Result<()> {
    let app = spawn_tracking_app().await;
    let mut sockets = app.join(&["alice", "bob", "carol"]).await;

    sockets[0].send(&call_user("bob")).await?;
    assert!(matches!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IncomingCall { .. }
    ));
    sockets[1].send(&answer("alice")).await?;
    assert!(matches!(
        next_event(&mut sockets[0]).await,
        ServerEvent::CallAccepted { .. }
    ));

    sleep(RING_TIMEOUT * 2).await;
    assert_silent(&mut sockets[0]).await;
    assert_silent(&mut sockets[1]).await;

    sockets[2].send(&call_user("bob")).await?;
    assert_eq!(
        next_event(&mut sockets[2]).await,
        ServerEvent::UserInCall {
            receiver_id: "bob".into()
        }
    );
    assert_eq!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IncomingCallWhileBusy {
            from: "carol".into()
        }
    );

    // Hanging up frees bob again.
    sockets[0]
        .send(&ClientEvent::CallEnd { to: "bob".into() })
        .await?;
    assert_eq!(next_event(&mut sockets[1]).await, ServerEvent::CallEnded);

    sockets[2].send(&call_user("bob")).await?;
    assert!(matches!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IncomingCall { .. }
    ));
    Ok(())
}

#[actix_web::test]
async fn rejected_call_does_not_time_out() -> anyhow::Result<()> {
    let app = spawn_tracking_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;

    sockets[0].send(&call_user("bob")).await?;
    assert!(matches!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IncomingCall { .. }
    ));
    sockets[1]
        .send(&ClientEvent::CallReject { to: "alice".into() })
        .await?;
    assert_eq!(next_event(&mut sockets[0]).await, ServerEvent::CallRejected);

    sleep(RING_TIMEOUT * 2).await;
    assert_silent(&mut sockets[0]).await;
    assert_silent(&mut sockets[1]).await;
    Ok(())
}

#[actix_web::test]
async fn answer_that_settles_no_call_leaves_both_sides_reachable() -> anyhow::Result<()> {
    let app = spawn_tracking_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;

    // Nobody called bob and carol never connected.
    sockets[1].send(&answer("carol")).await?;
    assert_silent(&mut sockets[1]).await;

    sockets[0].send(&call_user("bob")).await?;
    assert!(matches!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IncomingCall { .. }
    ));
    assert_silent(&mut sockets[0]).await;
    Ok(())
}

#[actix_web::test]
async fn caller_leaving_while_ringing_cancels_the_timeout() -> anyhow::Result<()> {
    let app = spawn_tracking_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;
    let mut bob = sockets.remove(1);
    let mut alice = sockets.remove(0);

    alice.send(&call_user("bob")).await?;
    assert!(matches!(
        next_event(&mut bob).await,
        ServerEvent::IncomingCall { .. }
    ));

    alice.close().await?;
    assert_eq!(next_event(&mut bob).await, online_users(&["bob"]));

    sleep(RING_TIMEOUT * 2).await;
    assert_silent(&mut bob).await;
    Ok(())
}
