//! 定时运动测试（Mock 总线）

use intermode_can::{MockBus, MockCanAdapter, SentFrame};
use intermode_driver::{DriverError, IntermodeBase, IntermodeBaseBuilder};
use intermode_protocol::{AccelerationField, DriveCommand, DriveCommandFrame, Gear, SteerMode};
use serde_json::json;
use std::time::{Duration, Instant};

fn mock_base() -> (IntermodeBase, MockBus) {
    let (adapter, bus) = MockCanAdapter::pair();
    let base = IntermodeBaseBuilder::new()
        .build_with_adapter(adapter)
        .unwrap();
    (base, bus)
}

/// 第一帧非停车帧及其后第一帧停车帧
fn motion_window(sent: &[SentFrame]) -> (SentFrame, SentFrame) {
    let stop = DriveCommand::stop().to_frame();
    let first = sent
        .iter()
        .position(|s| s.frame != stop)
        .expect("a drive frame was published");
    let end = sent[first..]
        .iter()
        .find(|s| s.frame == stop)
        .copied()
        .expect("a stop frame followed the motion");
    (sent[first], end)
}

#[test]
fn test_move_straight_scenario() {
    let (base, bus) = mock_base();

    let start = Instant::now();
    base.move_straight(1000, 200.0).unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(7), "elapsed {:?}", elapsed);

    // 停车帧已被采用，等它真正上总线
    let stop = DriveCommand::stop().to_frame();
    assert!(bus.wait_until(Duration::from_secs(1), |sent| {
        sent.last().map(|s| s.frame) == Some(stop)
    }));
    base.close();

    let sent = bus.sent();
    let (drive, end) = motion_window(&sent);
    let decoded = DriveCommandFrame::try_from(drive.frame).unwrap();
    assert_eq!(decoded.acceleration, AccelerationField::Accelerate { raw: 160 });
    assert_eq!(decoded.steering_angle, 0.0);
    assert_eq!(decoded.gear, Gear::Drive);
    assert_eq!(decoded.steer_mode, SteerMode::FourWheelDrive);
    assert_eq!(drive.frame.data, [0xA0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x02]);

    let driven = end.at.duration_since(drive.at);
    assert!(driven >= Duration::from_millis(4900), "driven {:?}", driven);
}

#[test]
fn test_move_straight_negative_distance_reverses() {
    let (base, bus) = mock_base();
    base.move_straight(-100, 1000.0).unwrap();
    base.close();

    let (drive, end) = motion_window(&bus.sent());
    let decoded = DriveCommandFrame::try_from(drive.frame).unwrap();
    assert_eq!(decoded.gear, Gear::Reverse);
    assert_eq!(decoded.acceleration, AccelerationField::Accelerate { raw: 160 });
    assert!(end.at.duration_since(drive.at) >= Duration::from_millis(90));
}

#[test]
fn test_move_straight_zero_speed_stops_immediately() {
    let (base, bus) = mock_base();
    let start = Instant::now();
    base.move_straight(1000, 0.0).unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));
    base.close();

    assert_eq!(bus.last_sent(), Some(DriveCommand::stop().to_frame()));
}

#[test]
fn test_spin_uses_angle_and_rate() {
    let (base, bus) = mock_base();
    let start = Instant::now();
    base.spin(30.0, 100.0).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
    base.close();

    let (drive, end) = motion_window(&bus.sent());
    let decoded = DriveCommandFrame::try_from(drive.frame).unwrap();
    assert_eq!(decoded.steering_angle, 30.0);
    assert_eq!(decoded.gear, Gear::Drive);
    assert_eq!(decoded.acceleration, AccelerationField::Accelerate { raw: 160 });
    assert!(end.at.duration_since(drive.at) >= Duration::from_millis(290));
}

#[test]
fn test_spin_beyond_limit_saturates() {
    let (base, bus) = mock_base();
    base.spin(-180.0, 1800.0).unwrap();
    base.close();

    let (drive, _) = motion_window(&bus.sent());
    let decoded = DriveCommandFrame::try_from(drive.frame).unwrap();
    assert_eq!(decoded.steering_angle, -90.0);
}

#[test]
fn test_do_command_rejects_everything() {
    let (base, _bus) = mock_base();
    let args = json!({ "command": "calibrate" });
    let result = base.do_command(args.as_object().unwrap());
    assert!(matches!(result, Err(DriverError::UnknownCommand(name)) if name == "calibrate"));
    base.close();
}

#[test]
fn test_non_finite_power_publishes_brake() {
    let (base, bus) = mock_base();
    base.set_power(
        nalgebra::Vector3::new(0.0, f64::NAN, 0.0),
        nalgebra::Vector3::new(0.0, 0.0, 0.1),
    )
    .unwrap();

    let stop = DriveCommand::stop().to_frame();
    assert!(bus.wait_until(Duration::from_secs(2), |sent| {
        sent.last().is_some_and(|s| s.frame != stop)
    }));
    base.close();

    let frame = bus.sent().last().map(|s| s.frame).unwrap();
    let decoded = DriveCommandFrame::try_from(frame).unwrap();
    assert_eq!(decoded.acceleration, AccelerationField::Brake);
    assert_eq!(decoded.gear, Gear::Drive);
    assert!((decoded.steering_angle - 10.0).abs() < 1.0 / 128.0);
}
