//! demo 命令
//!
//! 运行示例例程。未选择任何示例时只打印说明，不连接机器人。
//! Ctrl+C 在两次门面调用之间生效，随后发送 stop()。

use anyhow::Result;
use clap::{Args, ValueEnum};
use rider_control::{Example, RoutineError};
use std::io;

use crate::session::{GlobalArgs, Session};

const BANNER_RULE: &str = "==================================================";

/// 可选示例
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSelection {
    BasicMovement,
    SensorReading,
    DisplayControl,
    Conditional,
    Sequence,
    /// 按顺序运行全部示例
    All,
}

impl DemoSelection {
    fn examples(self) -> &'static [Example] {
        match self {
            DemoSelection::BasicMovement => &[Example::BasicMovement],
            DemoSelection::SensorReading => &[Example::SensorReading],
            DemoSelection::DisplayControl => &[Example::DisplayControl],
            DemoSelection::Conditional => &[Example::ConditionalBehavior],
            DemoSelection::Sequence => &[Example::Sequence],
            DemoSelection::All => &Example::ALL,
        }
    }
}

/// demo 命令参数
#[derive(Args, Debug)]
pub struct DemoCommand {
    /// 要运行的示例（可多选）
    #[arg(value_enum)]
    pub examples: Vec<DemoSelection>,
}

impl DemoCommand {
    /// 展开选择并去重，保持首次出现的顺序
    fn selected(&self) -> Vec<Example> {
        let mut selected: Vec<Example> = Vec::new();
        for example in self.examples.iter().flat_map(|s| s.examples()) {
            if !selected.contains(example) {
                selected.push(*example);
            }
        }
        selected
    }

    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        print_banner();

        let selected = self.selected();
        if selected.is_empty() {
            println!("Note: No examples selected. Pass one or more of:");
            for example in Example::ALL {
                println!("  {}", example.name());
            }
            println!("  all");
            println!("Make sure your Rider-Pi is connected and configured correctly.");
            return Ok(());
        }

        let mut session = Session::connect(global)?;
        let interrupt = session.interrupt_flag();
        let mut out = io::stdout().lock();
        for example in selected {
            match example.run_interruptible(&mut session.robot, &mut out, &interrupt) {
                Ok(()) => {},
                Err(RoutineError::Interrupted) => break,
                Err(e) => return Err(e.into()),
            }
        }
        // 例程在下一次门面调用之前返回，此处补发 stop()
        session.stop_if_interrupted()?;
        Ok(())
    }
}

fn print_banner() {
    println!("{}", BANNER_RULE);
    println!("Rider-Pi - Basic Usage Examples");
    println!("{}", BANNER_RULE);
    println!();
}
