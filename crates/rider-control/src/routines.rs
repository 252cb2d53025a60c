//! 示例例程
//!
//! 每个例程在 `&mut RiderPi` 上顺序执行一组门面调用，并把进度写入任意 `io::Write`。
//! 任一调用失败即返回，不做补偿动作。每次门面调用之前检查中断标志，
//! 置位时返回 [`RoutineError::Interrupted`]，由调用方决定是否发送 stop()。

use crate::error::RoutineError;
use rider_client::RiderPi;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

type Result<T> = std::result::Result<T, RoutineError>;

/// 低电量时显示的表情
pub const WARNING_EXPRESSION: i64 = 10;

/// 正常状态的表情
pub const HAPPY_EXPRESSION: i64 = 1;

const SECTION_RULE: &str = "----------------------------------------";

/// 可选的示例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Example {
    BasicMovement,
    SensorReading,
    DisplayControl,
    ConditionalBehavior,
    Sequence,
}

impl Example {
    /// 按编号顺序排列的全部示例
    pub const ALL: [Example; 5] = [
        Example::BasicMovement,
        Example::SensorReading,
        Example::DisplayControl,
        Example::ConditionalBehavior,
        Example::Sequence,
    ];

    /// 命令行中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            Example::BasicMovement => "basic-movement",
            Example::SensorReading => "sensor-reading",
            Example::DisplayControl => "display-control",
            Example::ConditionalBehavior => "conditional",
            Example::Sequence => "sequence",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|example| example.name() == name)
    }

    pub fn title(self) -> &'static str {
        match self {
            Example::BasicMovement => "Example 1: Basic Movement",
            Example::SensorReading => "Example 2: Sensor Reading",
            Example::DisplayControl => "Example 3: Display Control",
            Example::ConditionalBehavior => "Example 4: Conditional Behavior",
            Example::Sequence => "Example 5: Movement Sequence",
        }
    }

    /// 执行示例；条件行为使用配置中的低电量阈值
    pub fn run(self, robot: &mut RiderPi, out: &mut impl Write) -> Result<()> {
        self.run_interruptible(robot, out, &AtomicBool::new(false))
    }

    /// 执行示例，`interrupt` 置位后在下一次门面调用之前返回
    pub fn run_interruptible(
        self,
        robot: &mut RiderPi,
        out: &mut impl Write,
        interrupt: &AtomicBool,
    ) -> Result<()> {
        info!("Running example {}", self.name());
        match self {
            Example::BasicMovement => basic_movement(robot, out, interrupt),
            Example::SensorReading => sensor_reading(robot, out, interrupt),
            Example::DisplayControl => display_control(robot, out, interrupt),
            Example::ConditionalBehavior => {
                let threshold = robot.config().routines.low_battery_threshold;
                conditional_behavior(robot, out, interrupt, threshold)
            },
            Example::Sequence => greeting_sequence(robot, out, interrupt),
        }
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 带中断检查的机器人借用
struct Guarded<'a> {
    robot: &'a mut RiderPi,
    interrupt: &'a AtomicBool,
}

impl<'a> Guarded<'a> {
    fn new(robot: &'a mut RiderPi, interrupt: &'a AtomicBool) -> Self {
        Self { robot, interrupt }
    }

    fn robot(&mut self) -> Result<&mut RiderPi> {
        if self.interrupt.load(Ordering::SeqCst) {
            warn!("Routine interrupted");
            return Err(RoutineError::Interrupted);
        }
        Ok(&mut *self.robot)
    }
}

fn header(out: &mut impl Write, example: Example) -> Result<()> {
    writeln!(out, "{}", example.title())?;
    writeln!(out, "{}", SECTION_RULE)?;
    Ok(())
}

fn done(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Done!")?;
    writeln!(out)?;
    Ok(())
}

/// 前进 2 秒（50% 速度），旋转 90°，停止
pub fn basic_movement(
    robot: &mut RiderPi,
    out: &mut impl Write,
    interrupt: &AtomicBool,
) -> Result<()> {
    let mut guard = Guarded::new(robot, interrupt);
    header(out, Example::BasicMovement)?;

    writeln!(out, "Moving forward...")?;
    guard.robot()?.move_forward(2.0, 0.5)?;

    writeln!(out, "Rotating 90 degrees...")?;
    guard.robot()?.rotate(90.0, 0.5)?;

    writeln!(out, "Stopping...")?;
    guard.robot()?.stop()?;

    done(out)
}

/// 读取电量和姿态
pub fn sensor_reading(
    robot: &mut RiderPi,
    out: &mut impl Write,
    interrupt: &AtomicBool,
) -> Result<()> {
    let mut guard = Guarded::new(robot, interrupt);
    header(out, Example::SensorReading)?;

    let battery = guard.robot()?.get_battery_level()?;
    writeln!(out, "Battery Level: {}%", battery)?;

    let tilt = guard.robot()?.get_tilt_angle()?;
    writeln!(out, "Tilt Angle: {}", tilt)?;

    done(out)
}

/// 设置笑脸表情和绿灯
pub fn display_control(
    robot: &mut RiderPi,
    out: &mut impl Write,
    interrupt: &AtomicBool,
) -> Result<()> {
    let mut guard = Guarded::new(robot, interrupt);
    header(out, Example::DisplayControl)?;

    writeln!(out, "Setting display expression...")?;
    guard.robot()?.set_display_expression(HAPPY_EXPRESSION)?;

    writeln!(out, "Setting RGB light to green...")?;
    guard.robot()?.set_rgb_light(0, 255, 0)?;

    done(out)
}

/// 根据电量选择行为
///
/// 电量低于 `threshold` 时显示警告表情、红灯，并慢速前进 1 秒（驶向充电位）；
/// 否则显示笑脸和绿灯。
pub fn conditional_behavior(
    robot: &mut RiderPi,
    out: &mut impl Write,
    interrupt: &AtomicBool,
    threshold: f64,
) -> Result<()> {
    let mut guard = Guarded::new(robot, interrupt);
    header(out, Example::ConditionalBehavior)?;

    let battery = guard.robot()?.get_battery_level()?;
    writeln!(out, "Battery Level: {}%", battery)?;

    if battery.is_below(threshold) {
        writeln!(out, "⚠️  Low battery! Showing warning...")?;
        guard.robot()?.set_display_expression(WARNING_EXPRESSION)?;
        guard.robot()?.set_rgb_light(255, 0, 0)?;
        guard.robot()?.move_forward(1.0, 0.3)?;
    } else {
        writeln!(out, "✅ Battery OK. Normal operation.")?;
        guard.robot()?.set_display_expression(HAPPY_EXPRESSION)?;
        guard.robot()?.set_rgb_light(0, 255, 0)?;
    }

    done(out)
}

/// 问候序列：笑脸、绿灯、小步前进、左右摆动后回正、停止
pub fn greeting_sequence(
    robot: &mut RiderPi,
    out: &mut impl Write,
    interrupt: &AtomicBool,
) -> Result<()> {
    let mut guard = Guarded::new(robot, interrupt);
    header(out, Example::Sequence)?;

    writeln!(out, "Executing greeting sequence...")?;
    guard.robot()?.set_display_expression(HAPPY_EXPRESSION)?;
    guard.robot()?.set_rgb_light(0, 255, 0)?;
    guard.robot()?.move_forward(0.5, 0.3)?;
    guard.robot()?.rotate(45.0, 0.3)?;
    guard.robot()?.rotate(-45.0, 0.3)?;
    guard.robot()?.rotate(0.0, 0.3)?;
    guard.robot()?.stop()?;

    done(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for example in Example::ALL {
            assert_eq!(Example::from_name(example.name()), Some(example));
        }
        assert_eq!(Example::from_name("dance"), None);
    }

    #[test]
    fn test_titles_are_numbered_in_order() {
        for (i, example) in Example::ALL.iter().enumerate() {
            assert!(example.title().starts_with(&format!("Example {}:", i + 1)));
        }
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Example::ConditionalBehavior.to_string(), "conditional");
    }
}
