//! 脚本执行集成测试

use rider_client::{RiderConfig, RiderPi};
use rider_control::{Script, ScriptCommand, ScriptConfig, ScriptError, ScriptExecutor};
use rider_protocol::{MessageBody, Rgb};
use rider_transport::{MockHandle, MockTransport, SimulatedRobot};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

fn mock_robot() -> (RiderPi, MockHandle) {
    let (transport, handle) = MockTransport::new(SimulatedRobot::default().with_battery(55.0));
    (RiderPi::new(transport, RiderConfig::default()), handle)
}

fn script_with_bad_light() -> Script {
    Script {
        name: "bad light".into(),
        description: String::new(),
        commands: vec![
            ScriptCommand::Expression { code: 1 },
            ScriptCommand::Light { r: 0, g: 300, b: 0 },
            ScriptCommand::Light { r: 0, g: 255, b: 0 },
        ],
    }
}

#[test]
fn test_aborts_on_first_error_by_default() {
    let (mut robot, handle) = mock_robot();
    let mut out = Vec::new();

    let report = ScriptExecutor::new()
        .execute(&mut robot, &script_with_bad_light(), &mut out)
        .unwrap();

    assert_eq!(report.succeeded, vec![0]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 1);
    assert!(report.failed[0].1.contains("'g'"), "{:?}", report.failed);
    assert_eq!(report.skipped(), 1);
    assert!(!report.is_success());
    // 非法参数没有产生报文，第三条命令没有执行
    assert_eq!(handle.call_count(), 1);
    assert!(String::from_utf8(out).unwrap().contains("Script failed"));
}

#[test]
fn test_continue_on_error() {
    let (mut robot, handle) = mock_robot();
    let executor = ScriptExecutor::new().with_config(ScriptConfig {
        continue_on_error: true,
        ..Default::default()
    });

    let report = executor
        .execute(&mut robot, &script_with_bad_light(), &mut Vec::new())
        .unwrap();

    assert_eq!(report.succeeded, vec![0, 2]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.skipped(), 0);
    assert_eq!(handle.call_count(), 2);
    assert_eq!(handle.robot().rgb, Rgb::GREEN);
}

#[test]
fn test_readings_are_printed() {
    let (mut robot, _handle) = mock_robot();
    let script = Script {
        name: "readings".into(),
        description: "battery and tilt".into(),
        commands: vec![ScriptCommand::Battery, ScriptCommand::Tilt],
    };
    let mut out = Vec::new();

    let report = ScriptExecutor::new()
        .execute(&mut robot, &script, &mut out)
        .unwrap();

    assert!(report.is_success());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("📝 battery and tilt"));
    assert!(text.contains("Battery Level: 55%"));
    assert!(text.contains("Tilt Angle: Roll=0°, Pitch=0°, Yaw=0°"));
}

#[test]
fn test_preset_interrupt_sends_stop_only() {
    let (mut robot, handle) = mock_robot();
    let flag = Arc::new(AtomicBool::new(true));

    let report = ScriptExecutor::new()
        .with_interrupt(Arc::clone(&flag))
        .execute(&mut robot, &script_with_bad_light(), &mut Vec::new())
        .unwrap();

    assert!(report.interrupted);
    assert!(report.succeeded.is_empty());
    assert_eq!(handle.bodies(), vec![MessageBody::Stop]);
}

#[test]
fn test_interrupt_during_wait() {
    let (mut robot, handle) = mock_robot();
    let flag = Arc::new(AtomicBool::new(false));
    let script = Script {
        name: "long wait".into(),
        description: String::new(),
        commands: vec![
            ScriptCommand::Wait { duration_ms: 5_000 },
            ScriptCommand::MoveForward {
                duration: 1.0,
                speed: 0.5,
            },
        ],
    };

    let setter = Arc::clone(&flag);
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        setter.store(true, Ordering::SeqCst);
    });

    let report = ScriptExecutor::new()
        .with_interrupt(flag)
        .execute(&mut robot, &script, &mut Vec::new())
        .unwrap();
    interrupter.join().unwrap();

    assert!(report.interrupted);
    assert!(report.elapsed < Duration::from_secs(5));
    assert_eq!(handle.bodies(), vec![MessageBody::Stop]);
}

#[test]
fn test_unbounded_values_do_not_panic() {
    let (mut robot, handle) = mock_robot();
    let flag = Arc::new(AtomicBool::new(false));
    let script = Script {
        name: "far away".into(),
        description: String::new(),
        commands: vec![
            ScriptCommand::MoveForward {
                duration: 1.0e20,
                speed: 0.5,
            },
            ScriptCommand::Rotate {
                angle: 1.0e300,
                speed: 1.0,
            },
            ScriptCommand::Wait {
                duration_ms: u64::MAX,
            },
        ],
    };

    let setter = Arc::clone(&flag);
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        setter.store(true, Ordering::SeqCst);
    });

    let report = ScriptExecutor::new()
        .with_config(ScriptConfig {
            continue_on_error: true,
            ..Default::default()
        })
        .with_interrupt(flag)
        .execute(&mut robot, &script, &mut Vec::new())
        .unwrap();
    interrupter.join().unwrap();

    assert!(report.interrupted);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 1);
    assert_eq!(handle.robot().travel, 5.0e19);
}

#[test]
fn test_save_and_load_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.json");
    let script = Script {
        name: "roundtrip".into(),
        description: "saved and loaded".into(),
        commands: vec![
            ScriptCommand::Rotate {
                angle: 45.0,
                speed: 0.3,
            },
            ScriptCommand::Stop,
        ],
    };

    ScriptExecutor::save_script(&path, &script).unwrap();
    assert_eq!(ScriptExecutor::load_script(&path).unwrap(), script);
}

#[test]
fn test_load_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = ScriptExecutor::load_script(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(missing, ScriptError::Read { .. }));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let broken = ScriptExecutor::load_script(&path).unwrap_err();
    assert!(matches!(broken, ScriptError::Parse(_)));
}
