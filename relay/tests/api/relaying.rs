use serde_json::json;
use signaling::message::{ClientEvent, ServerEvent};

use crate::helper::{assert_silent, next_event, online_users, spawn_app};

fn call_user(to: &str, signal_data: serde_json::Value) -> ClientEvent {
    ClientEvent::CallInitiate {
        receiver_id: to.into(),
        signal_data,
        call_type: "video".to_string(),
    }
}

#[actix_web::test]
async fn alice_calls_bob_and_bob_answers() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;
    let (alice, bob) = sockets.split_at_mut(1);
    let (alice, bob) = (&mut alice[0], &mut bob[0]);

    let offer = json!({"type": "offer", "sdp": "v=0 alice"});
    alice.send(&call_user("bob", offer.clone())).await?;
    assert_eq!(
        next_event(bob).await,
        ServerEvent::IncomingCall {
            signal_data: offer,
            from: Some("alice".into()),
            call_type: "video".to_string(),
        }
    );
    assert_silent(alice).await;

    let answer = json!({"type": "answer", "sdp": "v=0 bob"});
    bob.send(&ClientEvent::CallAnswer {
        to: "alice".into(),
        signal_data: answer.clone(),
    })
    .await?;
    assert_eq!(
        next_event(alice).await,
        ServerEvent::CallAccepted {
            signal_data: answer
        }
    );
    assert_silent(bob).await;
    Ok(())
}

#[actix_web::test]
async fn candidates_flow_before_the_call_is_answered() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;

    let candidate = json!({"candidate": "candidate:0 1 UDP 2122252543 10.0.0.2 53421 typ host", "sdpMid": "0"});
    sockets[0]
        .send(&ClientEvent::IceCandidate {
            to: "bob".into(),
            candidate: candidate.clone(),
        })
        .await?;
    assert_eq!(
        next_event(&mut sockets[1]).await,
        ServerEvent::IceCandidate { candidate }
    );
    assert_silent(&mut sockets[0]).await;
    Ok(())
}

#[actix_web::test]
async fn reject_and_end_reach_only_the_target() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let mut sockets = app.join(&["alice", "bob", "carol"]).await;

    sockets[1]
        .send(&ClientEvent::CallReject { to: "alice".into() })
        .await?;
    assert_eq!(next_event(&mut sockets[0]).await, ServerEvent::CallRejected);

    sockets[0]
        .send(&ClientEvent::CallEnd { to: "bob".into() })
        .await?;
    assert_eq!(next_event(&mut sockets[1]).await, ServerEvent::CallEnded);

    for socket in sockets.iter_mut() {
        assert_silent(socket).await;
    }
    Ok(())
}

#[actix_web::test]
async fn calling_someone_who_never_connected_delivers_nothing() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let mut sockets = app.join(&["alice", "bob", "carol"]).await;

    sockets[2].send(&call_user("dave", json!("offer"))).await?;
    sockets[2]
        .send(&ClientEvent::IceCandidate {
            to: "dave".into(),
            candidate: json!("candidate"),
        })
        .await?;
    sockets[2]
        .send(&ClientEvent::CallEnd { to: "dave".into() })
        .await?;

    for socket in sockets.iter_mut() {
        assert_silent(socket).await;
    }
    Ok(())
}

#[actix_web::test]
async fn anonymous_connection_can_call_but_cannot_be_called() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let mut bob = app.join(&["bob"]).await.remove(0);

    let mut anonymous = app.connect(None).await;
    assert_eq!(next_event(&mut anonymous).await, online_users(&["bob"]));
    assert_eq!(next_event(&mut bob).await, online_users(&["bob"]));

    anonymous.send(&call_user("bob", json!("offer"))).await?;
    assert_eq!(
        next_event(&mut bob).await,
        ServerEvent::IncomingCall {
            signal_data: json!("offer"),
            from: None,
            call_type: "video".to_string(),
        }
    );

    // There is no user id to answer to, so nothing reaches the caller.
    bob.send(&ClientEvent::CallReject { to: "".into() }).await?;
    assert_silent(&mut anonymous).await;
    Ok(())
}

#[actix_web::test]
async fn malformed_frames_are_ignored() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let mut sockets = app.join(&["alice", "bob"]).await;

    sockets[0].send_text("not json".to_string()).await?;
    sockets[0]
        .send_text(r#"{"event":"hangUp","data":{"to":"bob"}}"#.to_string())
        .await?;
    assert_silent(&mut sockets[1]).await;

    sockets[0]
        .send(&ClientEvent::CallEnd { to: "bob".into() })
        .await?;
    assert_eq!(next_event(&mut sockets[1]).await, ServerEvent::CallEnded);
    Ok(())
}
