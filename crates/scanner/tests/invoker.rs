pub mod fixtures;

use cmb_scanner::{BridgeError, Invoker, NativeBridge, NativeCallback, NativeCommand, NativeReply};
use fixtures::{MockBridge, Script};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn invoker(mock: &MockBridge) -> Invoker {
    Invoker::new(Arc::new(mock.clone()))
}

#[tokio::test]
async fn success_payload_is_returned() {
    let mock = MockBridge::new();
    mock.once("getSdkVersion", Script::Succeed(json!("2.7.1")));

    let payload = invoker(&mock).call(NativeCommand::new("getSdkVersion")).await.unwrap();

    assert_eq!(payload, json!("2.7.1"));
    assert_eq!(mock.count("getSdkVersion"), 1);
}

#[tokio::test]
async fn error_channel_becomes_native_error() {
    let mock = MockBridge::new();
    mock.once("connect", Script::Fail(json!("Reader device not initialized")));

    let err = invoker(&mock).call(NativeCommand::new("connect")).await.unwrap_err();

    assert!(matches!(err, BridgeError::Native { .. }));
    assert_eq!(err.to_string(), "Reader device not initialized");
}

#[tokio::test]
async fn arguments_are_forwarded_unchanged() {
    let mock = MockBridge::new();
    let command = NativeCommand::new("setSymbologyEnabled").arg(1).arg(true);

    invoker(&mock).call(command.clone()).await.unwrap();

    assert_eq!(mock.calls(), [command]);
}

#[tokio::test]
async fn dropped_callback_is_reported() {
    let mock = MockBridge::new();
    mock.once("disconnect", Script::Drop);

    let err = invoker(&mock).call(NativeCommand::new("disconnect")).await.unwrap_err();

    assert!(matches!(err, BridgeError::CallbackDropped { command: "disconnect" }));
}

#[tokio::test]
async fn only_the_first_reply_counts() {
    let mock = MockBridge::new();
    mock.once(
        "isLightsOn",
        Script::Twice(NativeReply::Success(json!(1)), NativeReply::Error(json!("late"))),
    );

    let payload = invoker(&mock).call(NativeCommand::new("isLightsOn")).await.unwrap();

    assert_eq!(payload, json!(1));
}

#[tokio::test]
async fn hung_call_times_out_when_bounded() {
    let mock = MockBridge::new();
    mock.once("getDeviceBatteryLevel", Script::Hang);

    let err = invoker(&mock)
        .with_timeout(Some(Duration::from_millis(20)))
        .call(NativeCommand::new("getDeviceBatteryLevel"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::TimedOut { .. }));
    assert!(err.to_string().contains("timed out"), "{err}");
}

#[tokio::test]
async fn hung_call_stays_pending_without_timeout() {
    let mock = MockBridge::new();
    mock.once("getAvailability", Script::Hang);
    let invoker = invoker(&mock);

    let pending = tokio::time::timeout(
        Duration::from_millis(30),
        invoker.call(NativeCommand::new("getAvailability")),
    )
    .await;
    assert!(pending.is_err(), "an unbounded call must not settle on its own");

    // A late answer to the abandoned call is harmless.
    mock.release_hung(json!(1));
}

/// Replies from another thread after a delay, like a real SDK would.
struct Deferred;

impl NativeBridge for Deferred {
    fn exec(&self, command: NativeCommand, callback: NativeCallback) {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(5));
            callback.success(json!({ "echo": command.name }));
        });
    }
}

#[tokio::test]
async fn replies_from_other_threads_resolve_the_call() {
    let invoker = Invoker::new(Arc::new(Deferred));

    let payload = invoker.call(NativeCommand::new("beep")).await.unwrap();

    assert_eq!(payload, json!({ "echo": "beep" }));
}
