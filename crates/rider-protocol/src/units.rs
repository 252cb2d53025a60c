//! 强类型参数系统
//!
//! 使用 NewType 模式承载外部传入的松散数值（`f64`、`i64`），
//! 构造时完成范围校验，之后在各层之间以 `Copy` 值传递。
//!
//! # 示例
//!
//! ```rust
//! use rider_protocol::{Rgb, Speed};
//!
//! let speed = Speed::new(0.5).unwrap();
//! assert_eq!(speed.value(), 0.5);
//!
//! assert!(Speed::new(1.5).is_err());
//! assert!(Rgb::new(0, 256, 0).is_err());
//! ```

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 参数校验错误
///
/// 在任何报文发出之前产生，表示调用方传入的数值超出允许范围。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid parameter '{param}' = {value}: {reason}")]
pub struct ParamError {
    /// 参数名
    pub param: &'static str,
    /// 原始输入（格式化后）
    pub value: String,
    /// 原因
    pub reason: String,
}

impl ParamError {
    pub fn new(param: &'static str, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            param,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn require_finite(param: &'static str, value: f64) -> Result<f64, ParamError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::new(param, value, "must be a finite number"))
    }
}

/// 线上以 `f32` 编码的数值：有限且不超出 `f32` 范围
fn require_wire_f32(param: &'static str, value: f64) -> Result<f64, ParamError> {
    let value = require_finite(param, value)?;
    if value.abs() > f32::MAX as f64 {
        return Err(ParamError::new(param, value, "does not fit in a 32-bit float"));
    }
    Ok(value)
}

/// 秒数转换为 `Duration`，超出表示范围时饱和到 `Duration::MAX`
fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

fn require_u8(param: &'static str, value: i64) -> Result<u8, ParamError> {
    u8::try_from(value).map_err(|_| ParamError::new(param, value, "must be within [0, 255]"))
}

/// 速度（最大驱动能力的比例）
///
/// 取值范围 `[0.0, 1.0]`，两端均可取到。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speed(f64);

impl Speed {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;

    /// 静止
    pub const ZERO: Self = Speed(0.0);

    /// 全速
    pub const FULL: Self = Speed(1.0);

    pub fn new(value: f64) -> Result<Self, ParamError> {
        let value = require_finite("speed", value)?;
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ParamError::new("speed", value, "must be within [0.0, 1.0]"));
        }
        Ok(Speed(value))
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Speed {
    type Error = ParamError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Speed::new(value)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

/// 运动持续时间（秒）
///
/// 非负有限值，且不超出 `f32` 范围。`0` 合法，表示不产生位移。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveDuration(f64);

impl MoveDuration {
    pub const ZERO: Self = MoveDuration(0.0);

    pub fn new(secs: f64) -> Result<Self, ParamError> {
        let secs = require_wire_f32("duration", secs)?;
        if secs < 0.0 {
            return Err(ParamError::new("duration", secs, "must be >= 0"));
        }
        Ok(MoveDuration(secs))
    }

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// 转换为 `std::time::Duration`（超出表示范围时饱和）
    pub fn as_duration(self) -> Duration {
        saturating_secs(self.0)
    }
}

impl TryFrom<f64> for MoveDuration {
    type Error = ParamError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        MoveDuration::new(secs)
    }
}

impl fmt::Display for MoveDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} s", self.0)
    }
}

/// 角度（度）
///
/// 有符号，正负表示旋转方向。不做归一化：`rotate(720)` 表示原地转两圈。
/// 绝对值不得超出 `f32` 范围。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Self = Angle(0.0);

    pub fn new(degrees: f64) -> Result<Self, ParamError> {
        require_wire_f32("angle", degrees).map(Angle)
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn abs(self) -> Self {
        Angle(self.0.abs())
    }

    /// 归一化到 [-180, 180) 范围
    pub fn normalize(self) -> Self {
        let mut angle = (self.0 + 180.0).rem_euclid(360.0) - 180.0;
        // rem_euclid 对极小负数可能返回 360.0
        if angle >= 180.0 {
            angle -= 360.0;
        }
        Angle(angle)
    }

    /// 以 `speed` 比例、最大角速度 `turn_rate_dps`（度/秒）旋转所需的时间
    ///
    /// 速度为 0 时不产生旋转，返回零。
    pub fn rotation_time(self, speed: Speed, turn_rate_dps: f64) -> Duration {
        let rate = turn_rate_dps * speed.value();
        if rate <= 0.0 || !rate.is_finite() {
            return Duration::ZERO;
        }
        saturating_secs(self.0.abs() / rate)
    }
}

impl TryFrom<f64> for Angle {
    type Error = ParamError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Angle::new(degrees)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// 电池电量百分比
///
/// 取值范围 `[0, 100]`，两端均可取到。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryLevel(f64);

impl BatteryLevel {
    pub const EMPTY: Self = BatteryLevel(0.0);
    pub const FULL: Self = BatteryLevel(100.0);

    pub fn new(percent: f64) -> Result<Self, ParamError> {
        let percent = require_finite("battery", percent)?;
        if !(0.0..=100.0).contains(&percent) {
            return Err(ParamError::new("battery", percent, "must be within [0, 100]"));
        }
        Ok(BatteryLevel(percent))
    }

    #[inline]
    pub fn percent(self) -> f64 {
        self.0
    }

    /// 是否低于给定阈值（百分比）
    #[inline]
    pub fn is_below(self, threshold: f64) -> bool {
        self.0 < threshold
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 姿态读数（度）
///
/// 每次查询都重新从机器人读取，不做缓存。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TiltReading {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl TiltReading {
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// 三个分量是否都是有限值
    pub fn is_finite(&self) -> bool {
        self.roll.is_finite() && self.pitch.is_finite() && self.yaw.is_finite()
    }
}

impl fmt::Display for TiltReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Roll={}°, Pitch={}°, Yaw={}°",
            self.roll, self.pitch, self.yaw
        )
    }
}

/// 表情编号
///
/// 报文中以单字节传输，因此本地只校验 `0..=255`；
/// 编号的含义以及最终是否有效由机器人端的显示子系统决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpressionCode(u8);

impl ExpressionCode {
    pub fn new(code: i64) -> Result<Self, ParamError> {
        require_u8("expression_code", code).map(ExpressionCode)
    }

    #[inline]
    pub const fn from_raw(code: u8) -> Self {
        ExpressionCode(code)
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for ExpressionCode {
    fn from(code: u8) -> Self {
        ExpressionCode(code)
    }
}

impl fmt::Display for ExpressionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RGB 指示灯颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Self = Rgb::from_raw(0, 0, 0);
    pub const RED: Self = Rgb::from_raw(255, 0, 0);
    pub const GREEN: Self = Rgb::from_raw(0, 255, 0);
    pub const BLUE: Self = Rgb::from_raw(0, 0, 255);

    /// 从任意整数构造，每个通道必须在 `[0, 255]`
    pub fn new(r: i64, g: i64, b: i64) -> Result<Self, ParamError> {
        Ok(Self {
            r: require_u8("r", r)?,
            g: require_u8("g", g)?,
            b: require_u8("b", b)?,
        })
    }

    pub const fn from_raw(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
