pub mod fixtures;

use cmb_domain::config::{PreviewRect, ScannerConfig, SymbologyProfile};
use cmb_domain::{CodeMask, DeviceType, Symbology, TriggerType};
use cmb_scanner::{Envelope, EnvelopeFutureExt, Scanner};
use fixtures::{MockBridge, Script};
use proptest::prelude::*;
use serde_json::json;
use std::time::Duration;
use strum::IntoEnumIterator;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

proptest! {
    #[test]
    fn any_symbology_issues_one_call_and_succeeds_regardless_of_payload(
        symbology in proptest::sample::select(Symbology::iter().collect::<Vec<_>>()),
        enabled in any::<bool>(),
        payload in prop_oneof![Just(json!(0)), Just(json!(1)), Just(json!(true)), Just(json!(null))],
    ) {
        let mock = MockBridge::new();
        mock.once("setSymbologyEnabled", Script::Succeed(payload));

        let envelope = block_on(mock.scanner().set_symbology_enabled(symbology, enabled));

        prop_assert!(envelope.status);
        prop_assert!(envelope.err.is_none());
        prop_assert_eq!(mock.count("setSymbologyEnabled"), 1);
        let call = &mock.calls()[0];
        prop_assert_eq!(&call.args, &vec![json!(symbology.code()), json!(enabled)]);
    }
}

#[tokio::test]
async fn datamatrix_example_end_to_end() {
    let mock = MockBridge::new();
    mock.once("setSymbologyEnabled", Script::Succeed(json!(1)));

    let envelope = mock.scanner().set_symbology_enabled(Symbology::DataMatrix, true).await;

    assert_eq!(
        envelope.to_json(),
        json!({"action": "SET SYMBOL.DATAMATRIX ON", "status": true, "result": true, "err": null})
    );
}

#[tokio::test]
async fn symbology_results_use_loose_equality_with_one() {
    let mock = MockBridge::new();
    mock.once("isSymbologyEnabled", Script::Succeed(json!("0")));
    mock.once("isSymbologyEnabled", Script::Succeed(json!("1")));
    let scanner = mock.scanner();

    let off = scanner.is_symbology_enabled(Symbology::Qr).await;
    let on = scanner.is_symbology_enabled(Symbology::Qr).await;

    assert_eq!(off.action, "GET SYMBOL.QR");
    assert_eq!(off.result, Some(json!(false)));
    assert_eq!(on.result, Some(json!(true)));
}

#[tokio::test]
async fn native_errors_settle_the_envelope() {
    let mock = MockBridge::new();
    mock.once("setLightsOn", Script::Fail(json!("Reader device not connected")));

    let envelope = mock.scanner().set_lights_on(false).await;

    assert_eq!(
        envelope.to_json(),
        json!({"action": "SET LIGHT.INTERNAL-ENABLE OFF", "status": false, "err": "Reader device not connected"})
    );
}

#[tokio::test]
async fn load_scanner_reports_device_type_and_name() {
    let mock = MockBridge::new();
    mock.once("loadScanner", Script::Succeed(json!("")));

    let envelope = mock.scanner().load_scanner(DeviceType::MobileDevice).await;

    assert!(envelope.status);
    assert_eq!(envelope.result, Some(json!(true)));
    assert_eq!(envelope.extra("type"), Some(&json!(1)));
    assert_eq!(envelope.extra("name"), Some(&json!("DEVICE_TYPE_MOBILE_DEVICE")));
    assert_eq!(mock.calls()[0].args, [json!(1)]);
    assert_eq!(mock.count("connect"), 0, "loading must not connect");
}

#[tokio::test]
async fn connect_and_disconnect_report_true() {
    let mock = MockBridge::new();
    mock.once("connect", Script::Succeed(json!("connected")));
    let scanner = mock.scanner();

    assert_eq!(scanner.connect().await.result, Some(json!(true)));
    assert_eq!(scanner.disconnect().await.result, Some(json!(true)));
}

#[tokio::test]
async fn battery_level_is_exposed_as_result_and_charge() {
    let mock = MockBridge::new();
    mock.once("getDeviceBatteryLevel", Script::Succeed(json!(87)));

    let envelope = mock.scanner().get_device_battery_level().await;

    assert_eq!(envelope.action, "GET BATTERY.CHARGE");
    assert_eq!(envelope.result, Some(json!(87)));
    assert_eq!(envelope.extra("charge"), Some(&json!(87)));
}

#[tokio::test]
async fn send_command_uses_the_text_as_action() {
    let mock = MockBridge::new();
    mock.once("sendCommand", Script::Succeed(json!("MX-1502")));

    let envelope = mock.scanner().send_command("GET DEVICE.TYPE").await;

    assert_eq!(envelope.action, "GET DEVICE.TYPE");
    assert_eq!(envelope.result, Some(json!("MX-1502")));
    assert_eq!(mock.calls()[0].args, [json!("GET DEVICE.TYPE")]);
}

#[tokio::test]
async fn trigger_type_goes_through_send_command() {
    let mock = MockBridge::new();

    let envelope = mock.scanner().set_trigger_type(TriggerType::Continuous).await;

    assert_eq!(envelope.action, "SET TRIGGER.TYPE 5");
    assert_eq!(envelope.extra("trigger"), Some(&json!(5)));
    let call = &mock.calls()[0];
    assert_eq!(call.name, "sendCommand");
    assert_eq!(call.args, [json!("SET TRIGGER.TYPE 5")]);
}

#[tokio::test]
async fn image_scans_are_validated_locally() {
    let mock = MockBridge::new();
    let scanner = mock.scanner();

    let bad_uri = scanner.scan_image_from_uri("undefined").await;
    let bad_base64 = scanner.scan_image_from_base64("not base64 at all!").await;

    assert_eq!(bad_uri.err.as_deref(), Some("Invalid Uri"));
    assert_eq!(bad_uri.extra("uri"), Some(&json!("undefined")));
    assert_eq!(bad_base64.err.as_deref(), Some("Invalid base64 string"));
    assert!(mock.calls().is_empty());

    let uri = scanner.scan_image_from_uri("file:///data/code.png").await;
    let data_url = scanner.scan_image_from_base64("data:image/png;base64,iVBORw0KGgo=").await;
    assert_eq!(uri.result, Some(json!(true)));
    assert!(data_url.status);
    assert_eq!(mock.count("scanImageFromBase64"), 1);
}

#[tokio::test]
async fn camera_flags_echo_mask_and_flag() {
    let mock = MockBridge::new();

    let envelope = mock.scanner().enable_camera_flag(CodeMask::CODE_39, 0x2).await;

    assert_eq!(envelope.action, "ENABLE CAMERA.FLAG 8 2");
    assert_eq!(envelope.result, Some(json!(true)));
    assert_eq!(mock.calls()[0].args, [json!(8), json!(2)]);
}

#[tokio::test]
async fn denied_permission_reports_whether_it_can_be_requested() {
    let mock = MockBridge::new();
    mock.once("checkCameraPermission", Script::Fail(json!(1)));
    mock.once("requestCameraPermission", Script::Fail(json!(0)));
    let scanner = mock.scanner();

    let check = scanner.check_camera_permission().await;
    let request = scanner.request_camera_permission().await;

    assert_eq!(check.err.as_deref(), Some("1"));
    assert_eq!(check.extra("canRequest"), Some(&json!(true)));
    assert_eq!(request.extra("canRequest"), Some(&json!(false)));
}

#[tokio::test]
async fn preview_rect_is_clamped_before_sending() {
    let mock = MockBridge::new();
    let rect = PreviewRect { x: 0.0, y: 150.0, width: 100.0, height: 35.0 };

    let envelope = mock.scanner().set_preview_container_position_and_size(rect).await;

    assert_eq!(envelope.action, "SET PREVIEW.CONTAINER 0 100 100 35");
    assert_eq!(mock.calls()[0].args, [json!(0.0), json!(100.0), json!(100.0), json!(35.0)]);
}

#[tokio::test]
async fn dropped_callback_settles_as_failure() {
    let mock = MockBridge::new();
    mock.once("resetConfig", Script::Drop);

    let envelope = mock.scanner().reset_config().await;

    assert!(!envelope.status);
    assert_eq!(envelope.err.as_deref(), Some("Native bridge dropped the callback without replying"));
}

#[tokio::test]
async fn duplicate_reply_does_not_change_the_envelope() {
    let mock = MockBridge::new();
    mock.once(
        "getConnectionState",
        Script::Twice(
            cmb_scanner::NativeReply::Success(json!(2)),
            cmb_scanner::NativeReply::Error(json!("late")),
        ),
    );

    let envelope = mock.scanner().get_connection_state().await;

    assert!(envelope.status);
    assert_eq!(envelope.result, Some(json!(2)));
}

#[tokio::test]
async fn configured_timeout_settles_hung_calls() {
    let mock = MockBridge::new();
    mock.once("getSdkVersion", Script::Hang);
    let scanner = Scanner::builder()
        .bridge(mock.clone())
        .call_timeout(Duration::from_millis(20))
        .build();

    let envelope = scanner.get_sdk_version().await;

    assert!(!envelope.status);
    assert!(envelope.err.as_deref().is_some_and(|e| e.contains("timed out")), "{envelope:?}");
}

#[tokio::test]
async fn completion_handler_sees_the_settled_envelope() {
    let mock = MockBridge::new();
    mock.once("getAvailability", Script::Succeed(json!(1)));

    let status = mock.scanner().get_availability().complete_with(|e: Envelope| e.status).await;

    assert!(status);
}

#[tokio::test]
async fn profile_is_applied_in_order_for_mx_readers() {
    let mock = MockBridge::new();
    let config = ScannerConfig {
        trigger: Some(TriggerType::Manual),
        symbologies: SymbologyProfile {
            enable: vec![Symbology::Qr],
            disable: vec![Symbology::Code39],
        },
        ..ScannerConfig::default()
    };

    let envelopes = mock.scanner().apply_profile(&config).await;

    assert!(envelopes.iter().all(|e| e.status));
    let names: Vec<_> = mock.calls().iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        [
            "setParser",
            "enableImage",
            "enableImageGraphics",
            "setSymbologyEnabled",
            "setSymbologyEnabled",
            "sendCommand",
        ]
    );
    assert_eq!(envelopes[4].action, "SET SYMBOL.C39 OFF");
}

#[tokio::test]
async fn profile_result_toggles_reach_the_native_side() {
    let mock = MockBridge::new();
    let mut config = ScannerConfig::default();
    config.results.image = true;
    config.results.image_graphics = true;

    mock.scanner().apply_profile(&config).await;

    let calls = mock.calls();
    let image = calls.iter().find(|c| c.name == "enableImage").expect("enableImage");
    let graphics = calls.iter().find(|c| c.name == "enableImageGraphics").expect("enableImageGraphics");
    assert_eq!(image.args, [json!(true)]);
    assert_eq!(graphics.args, [json!(true)]);
}

#[tokio::test]
async fn profile_includes_camera_settings_for_camera_readers() {
    let mock = MockBridge::new();
    mock.always("setCameraMode", Script::Fail(json!("Unknown")));
    let config = ScannerConfig { device: DeviceType::MobileDevice, ..ScannerConfig::default() };

    let envelopes = mock.scanner().apply_profile(&config).await;

    assert_eq!(mock.count("setCameraMode"), 1);
    assert_eq!(mock.count("setPreviewOptions"), 1);
    assert_eq!(envelopes.iter().filter(|e| !e.status).count(), 1, "a failure does not stop the rest");
    assert_eq!(mock.count("setSymbologyEnabled"), config.symbologies.enable.len());
}
